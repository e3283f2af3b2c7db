//! # Taskboard CLI
//!
//! Command-line front end for the Taskboard API. The session token is kept
//! in a JSON file between runs.
//!
//! ## Usage
//!
//! ```bash
//! taskboard register --name Ada --email ada@example.com --password 'correct horse'
//! taskboard login --email ada@example.com --password 'correct horse'
//! taskboard users
//! taskboard create --title "Write report" --assignee <user id> --due 2025-03-01
//! taskboard tasks --view overdue
//! taskboard update <task id> --status "In Progress"
//! taskboard delete <task id>
//! ```

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use taskboard_client::{
    api::{ApiClient, DEFAULT_API_URL},
    dashboard::{DashboardState, TaskFilter},
    form::{validate_signup, TaskForm},
    routes::{Navigation, Route},
    session::{FileSessionStore, SessionContext},
};
use taskboard_shared::models::task::{TaskDetails, TaskPriority, TaskStatus};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "Manage and assign team tasks", long_about = None)]
#[command(version)]
struct Cli {
    /// API base URL
    #[arg(long, env = "TASKBOARD_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Where the session token is kept
    #[arg(long, env = "TASKBOARD_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "TASKBOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TASKBOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// List users (for picking an assignee)
    Users,

    /// Show the dashboard
    Tasks {
        /// Case-insensitive match on title or description
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<TaskPriority>,
        /// Earliest due date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Latest due date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long, value_enum, default_value_t = View::All)]
        view: View,
    },

    /// Show one task
    Show { id: Uuid },

    /// Create a task
    Create {
        #[arg(long)]
        title: String,
        /// Assignee user id
        #[arg(long)]
        assignee: Uuid,
        #[arg(long, default_value = "")]
        description: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
        #[arg(long)]
        priority: Option<TaskPriority>,
        #[arg(long)]
        status: Option<TaskStatus>,
    },

    /// Update a task (creator or assignee)
    Update {
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        due: Option<NaiveDate>,
        #[arg(long)]
        priority: Option<TaskPriority>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        assignee: Option<Uuid>,
    },

    /// Delete a task (creator only)
    Delete { id: Uuid },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum View {
    All,
    Created,
    Assigned,
    Overdue,
}

impl Commands {
    fn route(&self) -> Route {
        match self {
            Commands::Register { .. } => Route::Signup,
            Commands::Login { .. } | Commands::Logout => Route::Login,
            Commands::Users | Commands::Tasks { .. } | Commands::Delete { .. } => Route::Dashboard,
            Commands::Create { .. } => Route::CreateTask,
            Commands::Show { id } | Commands::Update { id, .. } => Route::EditTask(*id),
        }
    }
}

fn default_session_file() -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".taskboard").join("session.json"))
        .unwrap_or_else(|| PathBuf::from(".taskboard-session.json"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let session_file = cli.session_file.unwrap_or_else(default_session_file);
    tracing::debug!(path = %session_file.display(), api_url = %cli.api_url, "Starting");

    let session = SessionContext::restore(FileSessionStore::new(session_file));

    if let Navigation::Redirect(to) = cli.command.route().guard(session.is_authenticated()) {
        let reason = session.outcome().message().unwrap_or("Please log in");
        anyhow::bail!("{} (redirected to {}; run `taskboard login`)", reason, to);
    }

    let mut client = ApiClient::new(cli.api_url, session)?;
    run(&mut client, cli.command).await
}

async fn run(client: &mut ApiClient, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Register {
            name,
            email,
            password,
        } => {
            validate_signup(&name, &email, &password)?;
            let profile = client.register(name.trim(), email.trim(), &password).await?;
            println!("Registered {} <{}>. Log in to continue.", profile.name, profile.email);
        }

        Commands::Login { email, password } => {
            let session = client.login(email.trim(), &password).await?;
            println!("Logged in until {}", session.expires_at.format("%Y-%m-%d %H:%M UTC"));
        }

        Commands::Logout => {
            client.logout()?;
            println!("Logged out");
        }

        Commands::Users => {
            for user in client.list_users().await? {
                println!("{}  {}", user.id, user.name);
            }
        }

        Commands::Tasks {
            search,
            status,
            priority,
            from,
            to,
            view,
        } => {
            let user_id = client.session().user_id().context("Please log in")?;
            let mut dashboard = DashboardState::new(user_id);
            dashboard.set_tasks(client.list_tasks().await?);
            dashboard.set_filter(TaskFilter {
                search,
                status,
                priority,
                due_date_start: from,
                due_date_end: to,
            });

            print_dashboard(&dashboard, view);
        }

        Commands::Show { id } => {
            let task = client.get_task(id).await?;
            print_task(&task);
            if !task.description.is_empty() {
                println!("    {}", task.description);
            }
        }

        Commands::Create {
            title,
            assignee,
            description,
            due,
            priority,
            status,
        } => {
            let me = client.session().user_id().context("Please log in")?;
            let mut form = TaskForm::new();
            form.title = title;
            form.description = description;
            form.due_date = due;
            form.priority = priority.unwrap_or_default();
            form.status = status.unwrap_or_default();
            form.assigned_to = Some(assignee);

            let saved = client.create_task(&form.payload()?).await?;
            println!("{}", form.notification(&saved, me));
            print_task(&saved);
        }

        Commands::Update {
            id,
            title,
            description,
            due,
            priority,
            status,
            assignee,
        } => {
            let me = client.session().user_id().context("Please log in")?;
            let mut form = TaskForm::edit(&client.get_task(id).await?);

            if let Some(title) = title {
                form.title = title;
            }
            if let Some(description) = description {
                form.description = description;
            }
            if due.is_some() {
                form.due_date = due;
            }
            if let Some(priority) = priority {
                form.priority = priority;
            }
            if let Some(status) = status {
                form.status = status;
            }
            if assignee.is_some() {
                form.assigned_to = assignee;
            }

            let saved = client.update_task(id, &form.payload()?).await?;
            println!("{}", form.notification(&saved, me));
            print_task(&saved);
        }

        Commands::Delete { id } => {
            let message = client.delete_task(id).await?;
            println!("{}", message);
        }
    }

    Ok(())
}

fn print_dashboard(dashboard: &DashboardState, view: View) {
    let views = dashboard.views();

    if let Some(newest) = dashboard.newest_assigned() {
        println!(
            "Newest task assigned to you: \"{}\" (assigned on {})",
            newest.title,
            newest.created_at.format("%Y-%m-%d")
        );
        println!();
    }

    let sections: Vec<(&str, &[TaskDetails])> = match view {
        View::All => vec![
            ("Tasks Created by Me", views.created_by_me.as_slice()),
            ("Tasks Assigned to Me", views.assigned_to_me.as_slice()),
            ("Overdue Tasks", views.overdue.as_slice()),
        ],
        View::Created => vec![("Tasks Created by Me", views.created_by_me.as_slice())],
        View::Assigned => vec![("Tasks Assigned to Me", views.assigned_to_me.as_slice())],
        View::Overdue => vec![("Overdue Tasks", views.overdue.as_slice())],
    };

    for (heading, tasks) in sections {
        println!("{} ({})", heading, tasks.len());
        if tasks.is_empty() {
            println!("  none");
        }
        for task in tasks {
            print_task(task);
        }
        println!();
    }
}

fn print_task(task: &TaskDetails) {
    let due = task
        .due_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "No due date".to_string());

    println!(
        "  {}  {} [{} / {}] due: {}  by {} -> {}",
        task.id,
        task.title,
        task.status,
        task.priority,
        due,
        task.created_by.name,
        task.assigned_to.name,
    );
}
