use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "user-cli")]
#[command(about = "Command-line client for the user service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Bearer token returned by `register` or `login`.
    #[arg(short, long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and print the issued token
    Register {
        username: String,
        email: String,
        password: String,
    },
    /// Log in and print the issued token
    Login { email: String, password: String },
    /// Show the authenticated user's profile
    Me,
    /// List every other user
    List,
    /// Show one user
    Get { id: u64 },
    /// Change your own username and/or email
    Update {
        id: u64,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Delete your own account
    Delete { id: u64 },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
    }

    let res = match cli.command {
        Commands::Register { username, email, password } => {
            client
                .post(format!("{}/api/auth/register", cli.url))
                .json(&json!({ "username": username, "email": email, "password": password }))
                .send()
                .await?
        }
        Commands::Login { email, password } => {
            client
                .post(format!("{}/api/auth/login", cli.url))
                .json(&json!({ "email": email, "password": password }))
                .send()
                .await?
        }
        Commands::Me => {
            client
                .get(format!("{}/api/users/me", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::List => {
            client
                .get(format!("{}/api/users", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Get { id } => {
            client
                .get(format!("{}/api/users/{}", cli.url, id))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Update { id, username, email } => {
            client
                .put(format!("{}/api/users/{}", cli.url, id))
                .headers(headers)
                .json(&update_body(username, email))
                .send()
                .await?
        }
        Commands::Delete { id } => {
            client
                .delete(format!("{}/api/users/{}", cli.url, id))
                .headers(headers)
                .send()
                .await?
        }
    };

    print_response(res).await
}

/// Only the fields that were given, so the service leaves the rest alone.
fn update_body(username: Option<String>, email: Option<String>) -> Value {
    let mut body = serde_json::Map::new();
    if let Some(username) = username {
        body.insert("username".into(), Value::String(username));
    }
    if let Some(email) = email {
        body.insert("email".into(), Value::String(email));
    }
    Value::Object(body)
}

fn error_message(status: StatusCode, json: &Value) -> String {
    match json.get("error").and_then(Value::as_str) {
        Some(message) => format!("service returned status {}: {}", status, message),
        None => format!("service returned status {}", status),
    }
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let json: Value = res.json().await.unwrap_or(Value::Null);

    if !status.is_success() {
        return Err(error_message(status, &json).into());
    }

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
