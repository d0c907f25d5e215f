use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcError {
    #[error("not initialized: run 'procdash init'")]
    NotInitialized,

    #[error("{kind} document not found: {id}")]
    DocumentNotFound { kind: String, id: String },

    #[error("{kind} document already exists: {id}")]
    DocumentExists { kind: String, id: String },

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("project already exists: {0}")]
    ProjectExists(String),

    #[error("project '{project}' is still referenced by {count} document(s)")]
    ProjectInUse { project: String, count: usize },

    #[error("price item not found: {0}")]
    PriceItemNotFound(String),

    #[error("price item already exists: {0}")]
    PriceItemExists(String),

    #[error("work item not found: {0}")]
    WorkItemNotFound(String),

    #[error("work item already exists: {0}")]
    WorkItemExists(String),

    #[error("price item '{price}' is used by work item '{work_item}'")]
    PriceItemInUse { price: String, work_item: String },

    #[error("invalid id '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidId(String),

    #[error("invalid order: {0}")]
    InvalidOrder(String),

    #[error("invalid sort spec '{0}': expected key[:asc|:desc]")]
    InvalidSortSpec(String),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("invalid document kind: {0}")]
    InvalidKind(String),

    #[error("invalid direction '{0}': expected up or down")]
    InvalidDirection(String),

    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("import failed: {0}")]
    Import(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProcError>;
