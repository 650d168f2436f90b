use clap::Parser;
use colored::*;
use heymeme::backends::Google;
use heymeme::chat::ChatProvider;
use heymeme::gif::{search_all, GiphyClient};
use heymeme::keys::{ApiKeys, KeyStore};
use heymeme::keywords::KeywordTranslator;
use heymeme::persona::{find_persona, random_persona, PERSONAS};
use heymeme::relay::{RelayClient, RelayServer};
use heymeme::session::ChatSession;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use spinners::{Spinner, Spinners};
use std::io::{self, Write};

/// Command line arguments for the HeyMeme CLI
#[derive(Parser)]
#[clap(
    name = "heymeme",
    about = "Turn your mood into memes: GIF search and persona chat from the terminal",
    allow_hyphen_values = true
)]
struct CliArgs {
    /// Command to execute (search, trending, chat, personas, serve, set, get, delete)
    #[arg(index = 1)]
    command: Option<String>,

    /// Mood text for search, persona id for chat, or key name for set/get/delete
    #[arg(index = 2)]
    argument: Option<String>,

    /// Secret value for the set command
    #[arg(index = 3)]
    value: Option<String>,

    /// Relay server URL to route chat through instead of calling Gemini directly
    #[arg(long)]
    relay: Option<String>,

    /// Gemini model name override
    #[arg(long)]
    model: Option<String>,

    /// Maximum number of GIFs to fetch per provider
    #[arg(long, default_value_t = 12)]
    limit: u32,

    /// Listen address for the serve command
    #[arg(long, default_value = "127.0.0.1:3001")]
    addr: String,
}

/// Returns the Gemini API key from the environment, checking the names the
/// relay and the app historically used.
fn gemini_api_key() -> Option<String> {
    ["GEMINI_API_KEY", "GOOGLE_API_KEY"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|v| !v.is_empty())
}

fn print_gifs(gifs: &[heymeme::gif::GifItem]) {
    if gifs.is_empty() {
        println!("{}", "No GIFs found. Try a different mood.".bright_yellow());
        return;
    }
    for gif in gifs {
        println!(
            "{} {}\n  {}",
            format!("[{}]", gif.source).bright_black(),
            gif.title.bright_green(),
            gif.images.original.url
        );
    }
}

async fn run_search(mood: &str, limit: u32) -> Result<(), Box<dyn std::error::Error>> {
    let store = KeyStore::new()?;
    let keys = ApiKeys::resolve(&store);
    if !keys.any_gif_provider() {
        eprintln!(
            "{} No GIF provider configured. Run 'heymeme set giphy_key <key>' or 'heymeme set tenor_key <key>'.",
            "Error:".bright_red()
        );
        return Ok(());
    }

    let mut sp = Spinner::new(
        Spinners::Dots12,
        "Translating your mood...".bright_magenta().to_string(),
    );
    let keywords = match gemini_api_key() {
        Some(key) => {
            KeywordTranslator::from_keys(&key, keys.openai.as_deref())
                .translate(mood)
                .await
        }
        // No LLM key means the mood itself becomes the search string.
        None => mood.to_string(),
    };
    sp.stop();
    print!("\r\x1B[K");
    println!("Searching for: {}", keywords.bright_cyan());

    let gifs = search_all(&keys, &keywords, limit).await;
    print_gifs(&gifs);
    Ok(())
}

async fn run_trending(limit: u32) -> Result<(), Box<dyn std::error::Error>> {
    let store = KeyStore::new()?;
    let keys = ApiKeys::resolve(&store);
    if keys.giphy.is_empty() {
        eprintln!(
            "{} Trending needs a Giphy key. Run 'heymeme set giphy_key <key>'.",
            "Error:".bright_red()
        );
        return Ok(());
    }
    let gifs = GiphyClient::new(keys.giphy.clone()).trending(limit).await?;
    print_gifs(&gifs);
    Ok(())
}

async fn run_chat(args: &CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = KeyStore::new()?;
    let keys = ApiKeys::resolve(&store);

    let persona = match args.argument.as_deref() {
        Some(id) => find_persona(id).ok_or_else(|| {
            let ids: Vec<&str> = PERSONAS.iter().map(|p| p.id).collect();
            format!("Unknown persona '{}'. Available: {}", id, ids.join(", "))
        })?,
        None => random_persona(),
    };

    let primary: Box<dyn ChatProvider> = match &args.relay {
        Some(url) => Box::new(RelayClient::new(url.clone(), persona.system_instruction)),
        None => {
            let key = gemini_api_key().ok_or(
                "No Gemini key found. Set GEMINI_API_KEY, or pass --relay <url> to use a relay server.",
            )?;
            Box::new(Google::new(
                key,
                args.model.clone(),
                Some(0.9),
                Some(persona.system_instruction.to_string()),
            ))
        }
    };

    // The session injects the persona instruction into fallback payloads,
    // so the backup provider carries no system prompt of its own.
    let fallback = keys.openai.as_deref().map(|key| {
        Box::new(heymeme::backends::OpenAi::new(key, None, Some(0.9), None))
            as Box<dyn ChatProvider>
    });

    let giphy = if keys.giphy.is_empty() {
        None
    } else {
        Some(GiphyClient::new(keys.giphy.clone()))
    };

    let mut session = ChatSession::new(persona, primary, fallback, giphy);

    println!(
        "{} {}",
        persona.avatar,
        format!("{} - {}", persona.name, persona.description).bright_cyan()
    );
    println!("{}", "Type 'exit' to quit".bright_black());
    println!("{}", "─".repeat(50).bright_black());
    println!("{} {}", "> ".bright_green(), persona.welcome);

    let mut rl = DefaultEditor::new()?;

    loop {
        io::stdout().flush()?;
        let readline = rl.readline("> ");
        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.to_lowercase() == "exit" {
                    println!("{}", "👋 Goodbye!".bright_cyan());
                    break;
                }
                let _ = rl.add_history_entry(trimmed);

                let mut sp = Spinner::new(
                    Spinners::Dots12,
                    format!("{} is typing...", persona.name)
                        .bright_magenta()
                        .to_string(),
                );
                let outcome = session.send(trimmed).await;
                sp.stop();
                print!("\r\x1B[K");

                let label = format!("{} {}:", persona.avatar, persona.name);
                if outcome.is_error {
                    eprintln!("{} {}", label.bright_red(), outcome.message.text);
                } else {
                    println!("{} {}", label.bright_green(), outcome.message.text);
                    if let Some(url) = &outcome.message.meme_url {
                        println!("  {}", url.bright_blue());
                    }
                    if outcome.used_backup {
                        println!("{}", "(answered by the backup provider)".bright_black());
                    }
                }
                println!("{}", "─".repeat(50).bright_black());
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("\n{}", "👋 Goodbye!".bright_cyan());
                break;
            }
            Err(err) => {
                eprintln!("{} {:?}", "Error:".bright_red(), err);
                break;
            }
        }
    }

    Ok(())
}

async fn run_serve(args: &CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    let key = gemini_api_key()
        .ok_or("GEMINI_API_KEY environment variable is required to run the relay server")?;
    let mut server = RelayServer::new(key);
    if let Some(model) = &args.model {
        server = server.with_model(model.clone());
    }
    println!("Relay server listening on {}", args.addr.bright_green());
    server.run(&args.addr).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    heymeme::init_logging();
    let args = CliArgs::parse();

    match args.command.as_deref() {
        Some("set") => {
            if let (Some(key), Some(value)) = (args.argument.as_deref(), args.value.as_deref()) {
                let mut store = KeyStore::new()?;
                store.set(key, value)?;
                println!("{} Key '{}' has been set.", "✓".bright_green(), key);
            } else {
                eprintln!("{} Usage: heymeme set <key> <value>", "Error:".bright_red());
            }
            Ok(())
        }
        Some("get") => {
            if let Some(key) = args.argument.as_deref() {
                let store = KeyStore::new()?;
                match store.get(key) {
                    Some(value) => println!("{}: {}", key, value),
                    None => println!("{} Key '{}' not found", "!".bright_yellow(), key),
                }
            } else {
                eprintln!("{} Usage: heymeme get <key>", "Error:".bright_red());
            }
            Ok(())
        }
        Some("delete") => {
            if let Some(key) = args.argument.as_deref() {
                let mut store = KeyStore::new()?;
                store.delete(key)?;
                println!("{} Key '{}' has been deleted.", "✓".bright_green(), key);
            } else {
                eprintln!("{} Usage: heymeme delete <key>", "Error:".bright_red());
            }
            Ok(())
        }
        Some("personas") => {
            for persona in &PERSONAS {
                println!(
                    "{} {} ({})\n  {}",
                    persona.avatar,
                    persona.name.bright_green(),
                    persona.id.bright_black(),
                    persona.description
                );
            }
            Ok(())
        }
        Some("search") => {
            let mood = args
                .argument
                .as_deref()
                .ok_or("Usage: heymeme search <mood>")?;
            run_search(mood, args.limit).await
        }
        Some("trending") => run_trending(args.limit).await,
        Some("chat") => run_chat(&args).await,
        Some("serve") => run_serve(&args).await,
        Some(other) => {
            eprintln!("{} Unknown command '{}'", "Error:".bright_red(), other);
            eprintln!("Commands: search, trending, chat, personas, serve, set, get, delete");
            Ok(())
        }
        None => {
            println!("{}", "heymeme - mood to meme".bright_cyan());
            println!("Commands: search, trending, chat, personas, serve, set, get, delete");
            Ok(())
        }
    }
}
