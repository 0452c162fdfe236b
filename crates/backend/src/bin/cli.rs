use anyhow::Context;
use chrono::Datelike;
use clap::{Parser, Subcommand};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use shared_types::{
    CategoryNode, CreateCategoryRequest, CreateRepeatedTodoRequest, CreateTodoRequest, DayKey,
    RepeatedTodo, RepeatedTodoWithWeek, TodoStatus, TodoWithCategory, ToggleDayRequest,
    UpdateRepeatedTodoRequest, UpdateTodoRequest, WeekMap, WeekSnapshot,
};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "cc")]
#[command(about = "CLI for the command center: weekly habits, todos and categories")]
#[command(
    long_about = "A command-line interface for the command center backend.\n\n\
    Tracks repeated todos week by week, manages the daily todo board and\n\
    organizes categories. Every request is made on behalf of the user the\n\
    token belongs to."
)]
struct Cli {
    /// Backend server URL to connect to.
    #[arg(
        short,
        long,
        default_value = "http://localhost:3000",
        env = "CC_API_URL"
    )]
    base_url: String,

    /// JWT sent as a bearer token.
    #[arg(short, long, env = "CC_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the server and its database are up
    Health,
    /// Repeated todos with this week's checkmarks
    Repeated {
        #[command(subcommand)]
        action: RepeatedAction,
    },
    /// Manage the daily todo board
    Todos {
        #[command(subcommand)]
        action: TodoAction,
    },
    /// Manage nested categories
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
}

#[derive(Subcommand)]
enum RepeatedAction {
    /// Show every repeated todo with the current week (x = done)
    List,

    /// Add a repeated todo; its current week starts empty
    Add { title: String },

    /// Flip one day of the current week
    Toggle {
        id: Uuid,

        /// mon, tue, wed, thu, fri, sat or sun; defaults to today
        #[arg(value_parser = parse_day)]
        day: Option<DayKey>,
    },

    /// Change the title of a repeated todo
    Rename { id: Uuid, title: String },

    /// Delete a repeated todo and its history
    Remove { id: Uuid },
}

#[derive(Subcommand)]
enum TodoAction {
    /// List open todos for a day, or completed todos
    List {
        /// Day to show (YYYY-MM-DD); defaults to the server's today
        #[arg(short, long, value_name = "DATE")]
        date: Option<chrono::NaiveDate>,

        /// Show completed todos instead
        #[arg(short, long)]
        completed: bool,
    },

    /// Create a todo for today (or --date)
    Add {
        title: String,

        /// Category UUID to file the todo under.
        #[arg(short, long, value_name = "UUID")]
        category: Option<Uuid>,

        #[arg(short, long, value_name = "DATE")]
        date: Option<chrono::NaiveDate>,
    },

    /// Set a todo's status: today, pending, under_process or complete
    Status {
        id: Uuid,

        #[arg(value_parser = parse_status)]
        status: TodoStatus,
    },

    /// Permanently delete a todo
    Remove { id: Uuid },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// Show the category tree
    List,

    /// Create a category, optionally under a parent
    Add {
        name: String,

        #[arg(short, long, value_name = "UUID")]
        parent: Option<Uuid>,

        #[arg(short, long, value_name = "HEX")]
        color: Option<String>,
    },

    /// Delete a category and its subcategories
    Remove { id: Uuid },
}

fn parse_day(value: &str) -> Result<DayKey, String> {
    DayKey::from_str(&value.to_ascii_lowercase())
        .ok_or_else(|| format!("unknown day '{}', expected mon..sun", value))
}

fn parse_status(value: &str) -> Result<TodoStatus, String> {
    TodoStatus::from_str(value).ok_or_else(|| {
        format!(
            "unknown status '{}', expected today, pending, under_process or complete",
            value
        )
    })
}

/// Thin JSON client that attaches the bearer token and fails on error statuses.
struct Api {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl Api {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> anyhow::Result<reqwest::Response> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("request failed with {}: {}", status, body);
        }
        Ok(response)
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> anyhow::Result<T> {
        self.send(request)
            .await?
            .json()
            .await
            .context("Failed to decode response")
    }
}

fn short_id(id: &Uuid) -> String {
    id.to_string()[..8].to_string()
}

/// One character per day, Monday first: `x` done, `.` not done.
fn week_summary(week: &WeekMap) -> String {
    DayKey::ALL
        .iter()
        .map(|day| if week.get(*day) { 'x' } else { '.' })
        .collect()
}

fn toggle_summary(day: DayKey, snapshot: &WeekSnapshot) -> String {
    let week = snapshot.week();
    format!(
        "{} {} for week of {} ({}/7 done)",
        day.as_str(),
        if week.get(day) { "done" } else { "not done" },
        snapshot.week_start,
        week.completed_days()
    )
}

fn status_marker(status: TodoStatus) -> &'static str {
    match status {
        TodoStatus::Today => "○",
        TodoStatus::UnderProcess => "◐",
        TodoStatus::Pending => "…",
        TodoStatus::Complete => "✓",
    }
}

fn print_tree(nodes: &[CategoryNode], depth: usize) {
    for node in nodes {
        let color = node
            .category
            .color
            .as_deref()
            .map(|c| format!(" ({})", c))
            .unwrap_or_default();
        println!(
            "{}[{}] {}{}",
            "  ".repeat(depth),
            short_id(&node.category.id),
            node.category.name,
            color
        );
        print_tree(&node.children, depth + 1);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let api = Api {
        client: Client::new(),
        base_url: cli.base_url,
        token: cli.token,
    };

    match cli.command {
        Commands::Health => handle_health(&api).await?,
        Commands::Repeated { action } => handle_repeated(&api, action).await?,
        Commands::Todos { action } => handle_todos(&api, action).await?,
        Commands::Categories { action } => handle_categories(&api, action).await?,
    }

    Ok(())
}

async fn handle_health(api: &Api) -> anyhow::Result<()> {
    let response = api.client.get(api.url("/health")).send().await?;
    if response.status().is_success() {
        println!("OK");
        Ok(())
    } else {
        anyhow::bail!("server unhealthy: {}", response.status())
    }
}

async fn handle_repeated(api: &Api, action: RepeatedAction) -> anyhow::Result<()> {
    let url = api.url("/api/repeated-todos");

    match action {
        RepeatedAction::List => {
            let todos: Vec<RepeatedTodoWithWeek> = api.json(api.client.get(&url)).await?;
            if todos.is_empty() {
                println!("No repeated todos found.");
            } else {
                println!("           MTWTFSS");
                for todo in todos {
                    println!(
                        "[{}] {} {}",
                        short_id(&todo.id),
                        week_summary(&todo.week),
                        todo.title
                    );
                }
            }
        }
        RepeatedAction::Add { title } => {
            let req = CreateRepeatedTodoRequest { title };
            let todo: RepeatedTodo = api.json(api.client.post(&url).json(&req)).await?;
            println!("Created repeated todo: [{}] {}", short_id(&todo.id), todo.title);
        }
        RepeatedAction::Toggle { id, day } => {
            let day = day.unwrap_or_else(|| DayKey::from_weekday(chrono::Local::now().weekday()));
            let req = ToggleDayRequest { day };
            let snapshot: WeekSnapshot = api
                .json(api.client.put(format!("{}/{}/toggle", url, id)).json(&req))
                .await?;
            println!("{}", toggle_summary(day, &snapshot));
        }
        RepeatedAction::Rename { id, title } => {
            let req = UpdateRepeatedTodoRequest { title: Some(title) };
            let todo: RepeatedTodo = api
                .json(api.client.put(format!("{}/{}", url, id)).json(&req))
                .await?;
            println!("Renamed: [{}] {}", short_id(&todo.id), todo.title);
        }
        RepeatedAction::Remove { id } => {
            api.send(api.client.delete(format!("{}/{}", url, id))).await?;
            println!("Deleted repeated todo: {}", id);
        }
    }

    Ok(())
}

async fn handle_todos(api: &Api, action: TodoAction) -> anyhow::Result<()> {
    let url = api.url("/api/todos");

    match action {
        TodoAction::List { date, completed } => {
            let mut request = api.client.get(&url);
            if completed {
                request = request.query(&[("completed", "true")]);
            } else if let Some(date) = date {
                request = request.query(&[("for_date", date.to_string())]);
            }

            let todos: Vec<TodoWithCategory> = api.json(request).await?;
            if todos.is_empty() {
                println!("No todos found.");
            } else {
                for entry in todos {
                    let category = entry
                        .category
                        .map(|c| format!(" #{}", c.name))
                        .unwrap_or_default();
                    println!(
                        "{} [{}] {}{}",
                        status_marker(entry.todo.status),
                        short_id(&entry.todo.id),
                        entry.todo.title,
                        category
                    );
                }
            }
        }
        TodoAction::Add {
            title,
            category,
            date,
        } => {
            let req = CreateTodoRequest {
                title,
                category_id: category,
                for_date: date,
            };
            let entry: TodoWithCategory = api.json(api.client.post(&url).json(&req)).await?;
            println!(
                "Created todo: [{}] {}",
                short_id(&entry.todo.id),
                entry.todo.title
            );
        }
        TodoAction::Status { id, status } => {
            let req = UpdateTodoRequest {
                status: Some(status),
                ..Default::default()
            };
            let entry: TodoWithCategory = api
                .json(api.client.put(format!("{}/{}", url, id)).json(&req))
                .await?;
            println!(
                "{} [{}] {} is now {}",
                status_marker(entry.todo.status),
                short_id(&entry.todo.id),
                entry.todo.title,
                entry.todo.status.as_str()
            );
        }
        TodoAction::Remove { id } => {
            api.send(api.client.delete(format!("{}/{}", url, id))).await?;
            println!("Deleted todo: {}", id);
        }
    }

    Ok(())
}

async fn handle_categories(api: &Api, action: CategoryAction) -> anyhow::Result<()> {
    let url = api.url("/api/categories");

    match action {
        CategoryAction::List => {
            let tree: Vec<CategoryNode> = api.json(api.client.get(&url)).await?;
            if tree.is_empty() {
                println!("No categories found.");
            } else {
                print_tree(&tree, 0);
            }
        }
        CategoryAction::Add {
            name,
            parent,
            color,
        } => {
            let req = CreateCategoryRequest {
                name,
                parent_id: parent,
                color,
            };
            let category: shared_types::Category =
                api.json(api.client.post(&url).json(&req)).await?;
            println!(
                "Created category: [{}] {}",
                short_id(&category.id),
                category.name
            );
        }
        CategoryAction::Remove { id } => {
            api.send(api.client.delete(format!("{}/{}", url, id))).await?;
            println!("Deleted category: {}", id);
        }
    }

    Ok(())
}
