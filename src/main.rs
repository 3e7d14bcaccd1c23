use clap::{Arg, ArgAction, ArgMatches, Command};
use color_eyre::Result;
use std::sync::Arc;

mod adapters;
mod application;
mod domain;
mod ports;

use adapters::{
    api::{ApiClient, HttpProManageRepository, DEFAULT_SERVER_URL},
    session::FileSessionStore,
    tui::{run_tui, App},
};
use application::{AppController, SessionState};
use chrono::NaiveDate;
use domain::{NewUser, ProjectDraft, ProjectId, ProjectPatch, ProjectStatus};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize color-eyre for better error reporting
    color_eyre::install()?;

    // Log to a file so the TUI output stays clean
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("promanage-cli.log")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let matches = Command::new("promanage-cli")
        .version("0.1.0")
        .about("A terminal client for the ProManage project management API")
        .long_about(
            "A keyboard-driven terminal interface for managing ProManage projects.\n\n\
             Without a subcommand the full-screen interface starts; the subcommands\n\
             print JSON for scripting.",
        )
        .arg(
            Arg::new("server")
                .long("server")
                .value_name("URL")
                .help("Backend base URL (can also be set via PROMANAGE_URL env var)")
                .global(true),
        )
        .subcommand(
            Command::new("login")
                .about("Sign in and store the session token")
                .arg(Arg::new("username").long("username").short('u').required(true))
                .arg(Arg::new("password").long("password").short('p').required(true)),
        )
        .subcommand(Command::new("logout").about("Discard the stored session token"))
        .subcommand(
            Command::new("register")
                .about("Create a new account")
                .arg(Arg::new("username").long("username").required(true))
                .arg(Arg::new("email").long("email").required(true))
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("password").long("password").required(true))
                .arg(
                    Arg::new("role")
                        .long("role")
                        .default_value("user")
                        .help("Account role (the server decides what it grants)"),
                ),
        )
        .subcommand(
            Command::new("projects")
                .about("Project operations")
                .subcommand(Command::new("list").about("List visible projects as JSON"))
                .subcommand(
                    Command::new("get")
                        .about("Get a specific project by ID")
                        .arg(Arg::new("project_id").required(true).index(1)),
                )
                .subcommand(
                    Command::new("create")
                        .about("Create a project")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("description").long("description").default_value(""))
                        .arg(Arg::new("budget").long("budget").default_value(""))
                        .arg(
                            Arg::new("start_date")
                                .long("start-date")
                                .value_name("YYYY-MM-DD")
                                .required(true),
                        )
                        .arg(
                            Arg::new("end_date")
                                .long("end-date")
                                .value_name("YYYY-MM-DD"),
                        )
                        .arg(Arg::new("status").long("status").default_value("active")),
                )
                .subcommand(
                    Command::new("update")
                        .about("Update fields of a project")
                        .arg(Arg::new("project_id").required(true).index(1))
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("description").long("description"))
                        .arg(Arg::new("budget").long("budget"))
                        .arg(
                            Arg::new("start_date")
                                .long("start-date")
                                .value_name("YYYY-MM-DD"),
                        )
                        .arg(
                            Arg::new("end_date")
                                .long("end-date")
                                .value_name("YYYY-MM-DD"),
                        )
                        .arg(
                            Arg::new("clear_end_date")
                                .long("clear-end-date")
                                .action(ArgAction::SetTrue)
                                .help("Remove the end date"),
                        )
                        .arg(Arg::new("status").long("status")),
                )
                .subcommand(
                    Command::new("delete")
                        .about("Delete a project")
                        .arg(Arg::new("project_id").required(true).index(1))
                        .arg(
                            Arg::new("yes")
                                .long("yes")
                                .action(ArgAction::SetTrue)
                                .help("Confirm the deletion"),
                        ),
                ),
        )
        .subcommand(Command::new("stats").about("Print the dashboard aggregates as JSON"))
        .get_matches();

    let server_url = matches
        .get_one::<String>("server")
        .cloned()
        .or_else(|| std::env::var("PROMANAGE_URL").ok())
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

    // Wire the dependencies
    let session = Arc::new(FileSessionStore::new()?);
    let client = ApiClient::new(&server_url, session.clone())?;
    let repo = Arc::new(HttpProManageRepository::new(client));

    let controller = Arc::new(AppController::new(
        repo.clone(),
        repo.clone(),
        repo,
        session,
    ));

    match matches.subcommand() {
        Some(("login", login_matches)) => {
            let username = login_matches.get_one::<String>("username").unwrap();
            let password = login_matches.get_one::<String>("password").unwrap();

            match controller.login(username, password).await {
                Ok(()) => {
                    if let Some(user) = controller.current_user().await {
                        println!("Signed in as {} ({})", user.name, user.role);
                    }
                }
                Err(e) => fail(&format!("Login failed: {e}")),
            }
        }
        Some(("logout", _)) => {
            controller.logout().await;
            println!("Signed out");
        }
        Some(("register", register_matches)) => {
            let new_user = NewUser {
                username: register_matches.get_one::<String>("username").unwrap().clone(),
                email: register_matches.get_one::<String>("email").unwrap().clone(),
                name: register_matches.get_one::<String>("name").unwrap().clone(),
                password: register_matches.get_one::<String>("password").unwrap().clone(),
                role: register_matches.get_one::<String>("role").unwrap().clone(),
            };

            match controller.register(&new_user).await {
                Ok(user) => println!("{}", serde_json::to_string_pretty(&user)?),
                Err(e) => fail(&format!("Registration failed: {e}")),
            }
        }
        Some(("projects", projects_matches)) => {
            require_session(&controller).await;
            run_projects_command(&controller, projects_matches).await?;
        }
        Some(("stats", _)) => {
            require_session(&controller).await;
            match controller.fetch_stats().await {
                Ok(stats) => println!("{}", serde_json::to_string_pretty(&stats)?),
                Err(e) => fail(&format!("Failed to fetch stats: {e}")),
            }
        }
        None => {
            // Default behavior - run the TUI
            let app = App::new(controller);
            run_tui(app).await?;
        }
        _ => fail("Unknown command"),
    }

    Ok(())
}

async fn run_projects_command(
    controller: &AppController,
    matches: &ArgMatches,
) -> Result<()> {
    match matches.subcommand() {
        Some(("list", _)) => {
            // A fetch failure must not come out as an empty list
            if let Err(e) = controller.reload_projects().await {
                fail(&format!("Failed to load projects: {e}"));
            }
            let projects = controller.projects().await;
            println!("{}", serde_json::to_string_pretty(&projects)?);
        }
        Some(("get", get_matches)) => {
            let id = project_id(get_matches);
            match controller.get_project(&id).await {
                Ok(project) => println!("{}", serde_json::to_string_pretty(&project)?),
                Err(e) => fail(&format!("Failed to fetch project: {e}")),
            }
        }
        Some(("create", create_matches)) => {
            let draft = ProjectDraft {
                name: create_matches.get_one::<String>("name").unwrap().clone(),
                description: create_matches
                    .get_one::<String>("description")
                    .unwrap()
                    .clone(),
                budget: ProjectDraft::parse_budget(
                    create_matches.get_one::<String>("budget").unwrap(),
                ),
                start_date: parse_day(create_matches.get_one::<String>("start_date").unwrap()),
                end_date: create_matches
                    .get_one::<String>("end_date")
                    .map(|s| parse_day(s)),
                status: parse_status(create_matches.get_one::<String>("status").unwrap()),
            };

            match controller.create_project(&draft).await {
                Ok(project) => println!("{}", serde_json::to_string_pretty(&project)?),
                Err(e) => fail(&format!("Failed to create project: {e}")),
            }
        }
        Some(("update", update_matches)) => {
            let id = project_id(update_matches);
            let end_date = if update_matches.get_flag("clear_end_date") {
                Some(None)
            } else {
                update_matches
                    .get_one::<String>("end_date")
                    .map(|s| Some(parse_day(s)))
            };

            let patch = ProjectPatch {
                name: update_matches.get_one::<String>("name").cloned(),
                description: update_matches.get_one::<String>("description").cloned(),
                budget: update_matches
                    .get_one::<String>("budget")
                    .map(|s| ProjectDraft::parse_budget(s)),
                start_date: update_matches
                    .get_one::<String>("start_date")
                    .map(|s| parse_day(s)),
                end_date,
                status: update_matches
                    .get_one::<String>("status")
                    .map(|s| parse_status(s)),
            };

            match controller.update_project(&id, &patch).await {
                Ok(project) => println!("{}", serde_json::to_string_pretty(&project)?),
                Err(e) => fail(&format!("Failed to update project: {e}")),
            }
        }
        Some(("delete", delete_matches)) => {
            let id = project_id(delete_matches);
            if !delete_matches.get_flag("yes") {
                fail("Refusing to delete without --yes");
            }

            match controller.delete_project(&id).await {
                Ok(()) => println!("Deleted {id}"),
                Err(e) => fail(&format!("Failed to delete project: {e}")),
            }
        }
        _ => fail("Unknown projects subcommand"),
    }

    Ok(())
}

/// Restore the stored session and load data; protected subcommands bail
/// out when no valid session exists.
async fn require_session(controller: &AppController) {
    let _ = controller.initialize().await;
    if controller.state().await != SessionState::LoggedIn {
        eprintln!("Not signed in.");
        eprintln!();
        eprintln!("Run: promanage-cli login --username <user> --password <password>");
        std::process::exit(1);
    }
}

fn project_id(matches: &ArgMatches) -> ProjectId {
    ProjectId(matches.get_one::<String>("project_id").unwrap().clone())
}

fn parse_day(input: &str) -> NaiveDate {
    match NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => fail(&format!("Invalid date (expected YYYY-MM-DD): {input}")),
    }
}

fn parse_status(input: &str) -> ProjectStatus {
    match input {
        "active" => ProjectStatus::Active,
        "completed" => ProjectStatus::Completed,
        "paused" => ProjectStatus::Paused,
        other => fail(&format!(
            "Unknown status: {other} (expected active, completed or paused)"
        )),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}
