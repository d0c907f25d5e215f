use crate::cmd::{parse_date_arg, Tracked};
use crate::output::{opt_amount, opt_text, print_json, print_table};
use anyhow::Context;
use chrono::NaiveDate;
use clap::Subcommand;
use procdash_core::{
    filter::parse_sort_spec,
    record::{Project, PROJECT_SORT_KEYS},
    reorder::sort_view,
    store::Store,
    types::ProjectStatus,
};
use std::path::Path;

#[derive(Subcommand)]
pub enum ProjectSubcommand {
    /// Register a project
    Add {
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        client: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        budget: Option<f64>,
        #[arg(long, value_parser = parse_date_arg)]
        start: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date_arg)]
        end: Option<NaiveDate>,
    },
    /// List projects
    List {
        /// Only projects in this status
        #[arg(long)]
        status: Option<ProjectStatus>,
        /// Sort column: name, client, status, budget, start, end (suffix :desc)
        #[arg(long)]
        sort: Option<String>,
    },
    /// Show a project and its documents
    Show { id: String },
    /// Edit project fields
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        client: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        budget: Option<f64>,
        #[arg(long, value_parser = parse_date_arg)]
        start: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date_arg)]
        end: Option<NaiveDate>,
    },
    /// Set the project status
    Status { id: String, status: ProjectStatus },
    /// Remove a project with no remaining documents
    Remove { id: String },
}

pub fn run(root: &Path, subcmd: ProjectSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ProjectSubcommand::Add {
            id,
            name,
            client,
            location,
            budget,
            start,
            end,
        } => {
            let mut project = Project::new(&id, name);
            project.client = client;
            project.location = location;
            project.budget = budget;
            project.start_date = start;
            project.end_date = end;
            add(root, project, json)
        }
        ProjectSubcommand::List { status, sort } => list(root, status, sort.as_deref(), json),
        ProjectSubcommand::Show { id } => show(root, &id, json),
        ProjectSubcommand::Update {
            id,
            name,
            client,
            location,
            budget,
            start,
            end,
        } => update(root, &id, json, |p| {
            if let Some(v) = name {
                p.name = v;
            }
            if client.is_some() {
                p.client = client;
            }
            if location.is_some() {
                p.location = location;
            }
            if budget.is_some() {
                p.budget = budget;
            }
            if start.is_some() {
                p.start_date = start;
            }
            if end.is_some() {
                p.end_date = end;
            }
        }),
        ProjectSubcommand::Status { id, status } => update(root, &id, json, |p| p.status = status),
        ProjectSubcommand::Remove { id } => remove(root, &id, json),
    }
}

fn add(root: &Path, project: Project, json: bool) -> anyhow::Result<()> {
    let mut tracked = Tracked::open(root)?;
    let id = project.id.clone();
    tracked
        .store
        .add_project(project)
        .with_context(|| format!("failed to add project '{id}'"))?;
    tracked.commit(root)?;

    if json {
        print_json(&serde_json::json!({ "id": id, "added": true }))?;
    } else {
        println!("Added project '{id}'");
    }
    Ok(())
}

fn list(
    root: &Path,
    status: Option<ProjectStatus>,
    sort: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let store = Store::load(root).context("failed to load store")?;
    let mut projects: Vec<&Project> = store
        .projects()
        .iter()
        .filter(|p| status.is_none_or(|s| p.status == s))
        .collect();
    if let Some(spec) = sort {
        let state = parse_sort_spec(spec, PROJECT_SORT_KEYS)?;
        sort_view(&mut projects, &state);
    }

    if json {
        print_json(&projects)?;
        return Ok(());
    }
    if projects.is_empty() {
        println!("No projects.");
        return Ok(());
    }
    let rows = projects
        .iter()
        .map(|p| {
            vec![
                p.id.clone(),
                p.name.clone(),
                opt_text(p.client.as_deref()),
                p.status.to_string(),
                opt_amount(p.budget),
                store.documents_for_project(&p.id).len().to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "CLIENT", "STATUS", "BUDGET", "DOCS"], rows);
    Ok(())
}

fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let store = Store::load(root).context("failed to load store")?;
    let project = store.project(id)?;
    let docs = store.documents_for_project(id);

    if json {
        print_json(&serde_json::json!({ "project": project, "documents": docs }))?;
        return Ok(());
    }
    println!("Project: {} ({})", project.name, project.id);
    println!("Status:   {}", project.status);
    println!("Client:   {}", opt_text(project.client.as_deref()));
    println!("Location: {}", opt_text(project.location.as_deref()));
    println!("Budget:   {}", opt_amount(project.budget));
    println!("Start:    {}", opt_text(project.start_date));
    println!("End:      {}", opt_text(project.end_date));

    let committed: f64 = docs.iter().filter_map(|d| d.value).sum();
    println!("\nDocuments ({}), total value {}:", docs.len(), opt_amount(Some(committed)));
    for d in docs {
        println!("  [{}] {} {} ({})", d.kind, d.id, d.title, d.status);
    }
    Ok(())
}

fn update(
    root: &Path,
    id: &str,
    json: bool,
    f: impl FnOnce(&mut Project),
) -> anyhow::Result<()> {
    let mut tracked = Tracked::open(root)?;
    tracked.store.update_project(id, f)?;
    let status = tracked.store.project(id)?.status;
    tracked.commit(root)?;

    if json {
        print_json(&serde_json::json!({ "id": id, "status": status, "updated": true }))?;
    } else {
        println!("Updated project '{id}' ({status})");
    }
    Ok(())
}

fn remove(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let mut tracked = Tracked::open(root)?;
    tracked.store.remove_project(id)?;
    tracked.commit(root)?;

    if json {
        print_json(&serde_json::json!({ "id": id, "removed": true }))?;
    } else {
        println!("Removed project '{id}'");
    }
    Ok(())
}
