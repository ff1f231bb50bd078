mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, ListArgs, ProjectCommand, ScheduleCommand};
use planner_client::{
    api::dto::{
        format_date, format_time, AuthResponse, NewProject, NewSchedule, Project, ProjectPatch,
        Schedule, SchedulePatch, ScheduleQuery,
    },
    config::PlannerConfig,
    session_store::{self, StoredSession},
    ApiClient, ClientError, Locale, ProjectStore, ScheduleStore,
};
use time::OffsetDateTime;

const PASSWORD_ENV: &str = "PLANNER_PASSWORD";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match PlannerConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Warning: {err:#}. Using defaults.");
            PlannerConfig::default()
        }
    };
    let locale = cli.locale.unwrap_or(config.locale);

    if let Err(err) = run(cli, config).await {
        report(&err, locale);
        std::process::exit(1);
    }
}

fn report(err: &anyhow::Error, locale: Locale) {
    match err.downcast_ref::<ClientError>() {
        Some(client_err) => {
            eprintln!("{}", client_err.user_message(locale));
            if client_err.requires_login() {
                let _ = session_store::clear_session();
                eprintln!("Run `planner login` to authenticate.");
            }
        }
        None => eprintln!("Error: {err:#}"),
    }
}

async fn run(cli: Cli, config: PlannerConfig) -> Result<()> {
    let api_url = cli.api_url.unwrap_or(config.api_url);
    let client = ApiClient::new(&api_url)?;

    match cli.command {
        Commands::Login { username } => {
            let password = read_password()?;
            let auth = client.login(&username, &password).await?;
            save(&auth)?;
            println!("Logged in as {}.", auth.user.display_name);
        }
        Commands::Register {
            username,
            display_name,
        } => {
            let password = read_password()?;
            let auth = client
                .register(&username, &password, display_name.as_deref())
                .await?;
            save(&auth)?;
            println!("Registered and logged in as {}.", auth.user.username);
        }
        Commands::Logout => {
            session_store::clear_session()?;
            println!("Logged out.");
        }
        Commands::Whoami => {
            let user = authenticated(client)?.profile().await?;
            println!("{} ({}), id {}", user.display_name, user.username, user.id);
        }
        Commands::Projects(command) => projects(&authenticated(client)?, command).await?,
        Commands::Schedules(command) => schedules(&authenticated(client)?, command).await?,
        Commands::ConfigPath => {
            let path = PlannerConfig::ensure_exists()?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

fn read_password() -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }
    rpassword::prompt_password("Password: ").context("Failed to read password")
}

fn save(auth: &AuthResponse) -> Result<()> {
    session_store::save_session(&StoredSession {
        token: auth.token.clone(),
        username: auth.user.username.clone(),
        expires_at: auth.expires_at,
    })
}

fn authenticated(client: ApiClient) -> Result<ApiClient> {
    let session = session_store::load_session()?.ok_or(ClientError::NotAuthenticated)?;
    Ok(client.with_token(session.token))
}

async fn projects(client: &ApiClient, command: ProjectCommand) -> Result<()> {
    let mut store = ProjectStore::new();

    match command {
        ProjectCommand::List => {
            store.load(client).await?;
            if store.all().is_empty() {
                println!("No projects.");
            }
            for project in store.all() {
                print_project(project);
            }
        }
        ProjectCommand::Create {
            name,
            description,
            color,
        } => {
            let project = store
                .create(
                    client,
                    NewProject {
                        name,
                        description,
                        color,
                    },
                )
                .await?;
            print_project(&project);
        }
        ProjectCommand::Update {
            id,
            name,
            description,
            clear_description,
            color,
        } => {
            let description = if clear_description {
                Some(None)
            } else {
                description.map(Some)
            };
            let patch = ProjectPatch {
                name,
                description,
                color,
            };
            let project = store.update(client, id, patch).await?;
            print_project(&project);
        }
        ProjectCommand::Delete { id } => {
            store.delete(client, id).await?;
            println!("Deleted project {id}. Its schedules were kept without a project.");
        }
    }

    Ok(())
}

async fn schedules(client: &ApiClient, command: ScheduleCommand) -> Result<()> {
    let mut store = ScheduleStore::new();

    match command {
        ScheduleCommand::List(args) => {
            store.load(client, &query(args)).await?;
            if store.all().is_empty() {
                println!("No schedules.");
            }
            for schedule in store.all() {
                print_schedule(schedule);
            }
        }
        ScheduleCommand::Add {
            title,
            date,
            start,
            end,
            description,
            status,
            priority,
            project,
        } => {
            let date = date.unwrap_or_else(today);
            let schedule = store
                .create(
                    client,
                    NewSchedule {
                        description,
                        start_time: start,
                        end_time: end,
                        status,
                        priority,
                        project_id: project,
                        ..NewSchedule::new(title, date)
                    },
                )
                .await?;
            print_schedule(&schedule);
        }
        ScheduleCommand::Update {
            id,
            title,
            date,
            start,
            end,
            clear_times,
            priority,
            project,
            no_project,
        } => {
            let (start_time, end_time) = if clear_times {
                (Some(None), Some(None))
            } else {
                (start.map(Some), end.map(Some))
            };
            let project_id = if no_project {
                Some(None)
            } else {
                project.map(Some)
            };
            let patch = SchedulePatch {
                title,
                date,
                start_time,
                end_time,
                priority,
                project_id,
                ..Default::default()
            };
            let schedule = store.update(client, id, patch).await?;
            print_schedule(&schedule);
        }
        ScheduleCommand::Status { id, status } => {
            let schedule = store.set_status(client, id, status).await?;
            print_schedule(&schedule);
        }
        ScheduleCommand::Delete { id } => {
            store.delete(client, id).await?;
            println!("Deleted schedule {id}.");
        }
    }

    Ok(())
}

fn query(args: ListArgs) -> ScheduleQuery {
    ScheduleQuery {
        date: args.date,
        from: args.from,
        to: args.to,
        status: args.status,
        priority: args.priority,
        project_id: args.project,
    }
}

fn today() -> time::Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

fn print_project(project: &Project) {
    match &project.description {
        Some(description) => println!(
            "#{:<4} {} {}  {}",
            project.id, project.color, project.name, description
        ),
        None => println!("#{:<4} {} {}", project.id, project.color, project.name),
    }
}

fn print_schedule(schedule: &Schedule) {
    let times = match (schedule.start_time, schedule.end_time) {
        (Some(start), Some(end)) => format!("{}-{}", format_time(start), format_time(end)),
        (Some(start), None) => format!("{}-", format_time(start)),
        (None, Some(end)) => format!("-{}", format_time(end)),
        (None, None) => "all day".to_string(),
    };
    let project = schedule
        .project_id
        .map(|id| format!("  project #{id}"))
        .unwrap_or_default();

    println!(
        "#{:<4} {} {:<11} [{}/{}] {}{}",
        schedule.id,
        format_date(schedule.date),
        times,
        schedule.status.as_str(),
        schedule.priority.as_str(),
        schedule.title,
        project
    );
}
