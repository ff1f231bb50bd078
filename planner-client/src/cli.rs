use clap::{Args, Parser, Subcommand};
use planner_client::{
    api::dto::{Priority, ScheduleStatus},
    Locale,
};
use time::{macros::format_description, Date, Time};

#[derive(Debug, Parser)]
#[command(name = "planner")]
#[command(about = "Command-line client for the planner API")]
pub struct Cli {
    /// Override the API URL from the config file
    #[arg(long, env = "PLANNER_API_URL", global = true)]
    pub api_url: Option<String>,
    /// Language for error messages (en, ko)
    #[arg(long, env = "PLANNER_LOCALE", global = true)]
    pub locale: Option<Locale>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log in and store the session token
    Login { username: String },
    /// Create an account and log in
    Register {
        username: String,
        #[arg(long)]
        display_name: Option<String>,
    },
    /// Remove the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Manage projects
    #[command(subcommand)]
    Projects(ProjectCommand),
    /// Manage schedules
    #[command(subcommand)]
    Schedules(ScheduleCommand),
    /// Print config path and create default file if missing
    ConfigPath,
}

#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    List,
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Hex color such as #10B981
        #[arg(long)]
        color: Option<String>,
    },
    Update {
        id: i32,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long)]
        clear_description: bool,
        #[arg(long)]
        color: Option<String>,
    },
    Delete { id: i32 },
}

#[derive(Debug, Subcommand)]
pub enum ScheduleCommand {
    List(ListArgs),
    Add {
        title: String,
        /// Defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<Date>,
        #[arg(long, value_parser = parse_time)]
        start: Option<Time>,
        #[arg(long, value_parser = parse_time)]
        end: Option<Time>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_enum)]
        status: Option<ScheduleStatus>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        #[arg(long)]
        project: Option<i32>,
    },
    Update {
        id: i32,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_parser = parse_date)]
        date: Option<Date>,
        #[arg(long, value_parser = parse_time)]
        start: Option<Time>,
        #[arg(long, value_parser = parse_time)]
        end: Option<Time>,
        /// Remove start and end time
        #[arg(long, conflicts_with_all = ["start", "end"])]
        clear_times: bool,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        #[arg(long, conflicts_with = "no_project")]
        project: Option<i32>,
        #[arg(long)]
        no_project: bool,
    },
    Status {
        id: i32,
        #[arg(value_enum)]
        status: ScheduleStatus,
    },
    Delete { id: i32 },
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, value_parser = parse_date, conflicts_with_all = ["from", "to"])]
    pub date: Option<Date>,
    #[arg(long, value_parser = parse_date)]
    pub from: Option<Date>,
    #[arg(long, value_parser = parse_date)]
    pub to: Option<Date>,
    #[arg(long, value_enum)]
    pub status: Option<ScheduleStatus>,
    #[arg(long, value_enum)]
    pub priority: Option<Priority>,
    #[arg(long)]
    pub project: Option<i32>,
}

pub fn parse_date(value: &str) -> Result<Date, String> {
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .map_err(|_| format!("expected YYYY-MM-DD, got '{value}'"))
}

pub fn parse_time(value: &str) -> Result<Time, String> {
    Time::parse(value, format_description!("[hour]:[minute]"))
        .map_err(|_| format!("expected HH:MM, got '{value}'"))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use time::macros::{date, time};

    use super::*;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn date_and_time_arguments_parse() {
        assert_eq!(parse_date("2024-05-01"), Ok(date!(2024 - 05 - 01)));
        assert_eq!(parse_time("09:30"), Ok(time!(09:30)));
        assert!(parse_date("05/01/2024").is_err());
        assert!(parse_time("25:00").is_err());
    }

    #[test]
    fn list_rejects_date_with_range() {
        let result = Cli::try_parse_from([
            "planner",
            "schedules",
            "list",
            "--date",
            "2024-05-01",
            "--from",
            "2024-04-01",
        ]);
        assert!(result.is_err());
    }
}
