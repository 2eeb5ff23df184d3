//! The interactive shell: reads commands, checks the session and role, and
//! routes to the matching screen.

use crate::api::Backend;
use crate::config::Config;
use crate::nav::{self, Screen};
use crate::screens::{auth, chat, departments, history, indicators, users, values};
use crate::session::{Session, SessionStore};
use crate::transcript::Transcript;
use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::cell::RefCell;
use std::rc::Rc;

pub struct Context {
    pub config: Config,
    pub api: Rc<dyn Backend>,
    pub store: SessionStore,
    pub transcript: RefCell<Transcript>,
    pub session_id: String,
    pub chat_log: RefCell<Vec<chat::ChatLine>>,
}

pub fn run_repl(ctx: Context) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!("tally - connected to {}", ctx.config.base_url);
    println!("Type /help for commands, /exit to quit.");

    loop {
        match rl.readline("tally> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;

                if line.starts_with('/') {
                    match handle_command(&ctx, &mut rl, line) {
                        Ok(true) => break,
                        Ok(false) => {}
                        Err(e) => eprintln!("Error: {}", e),
                    }
                    continue;
                }

                // Free text goes to the assistant, the one screen every
                // role can reach.
                if let Err(e) = handle_screen(&ctx, &mut rl, Screen::Chat, line) {
                    eprintln!("Error: {}", e);
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Re-read the persisted session at dispatch time. A missing or unreadable
/// session means signed out: the user is pointed at /login rather than
/// shown a transient-error alert.
fn current_session(ctx: &Context) -> Option<Session> {
    match ctx.store.load() {
        Ok(Some(session)) => {
            ctx.api.set_token(Some(session.token.clone()));
            Some(session)
        }
        Ok(None) => {
            println!("You are signed out. Use /login first.");
            None
        }
        Err(_) => {
            println!("Your session is no longer valid. Please /login again.");
            None
        }
    }
}

/// Handle one slash command. Returns true to exit the shell.
fn handle_command(ctx: &Context, rl: &mut DefaultEditor, line: &str) -> Result<bool> {
    let parts: Vec<&str> = line.splitn(2, ' ').collect();
    let cmd = parts[0];
    let args = parts.get(1).copied().unwrap_or("");

    match cmd {
        "/exit" | "/quit" => return Ok(true),
        "/help" => print_help(ctx),
        "/login" => {
            if matches!(ctx.store.load(), Ok(Some(_))) {
                println!("Already signed in. /logout first to switch accounts.");
            } else {
                auth::login_screen(ctx, rl)?;
            }
        }
        "/logout" => {
            auth::logout(ctx.api.as_ref(), &ctx.store)?;
            let _ = ctx.transcript.borrow_mut().logout();
            println!("Signed out.");
        }
        "/forgot-password" => auth::forgot_password_screen(ctx, rl)?,
        "/password" => {
            if let Some(session) = current_session(ctx) {
                auth::change_password_screen(ctx, rl, &session)?;
            }
        }
        "/whoami" => match ctx.store.load() {
            Ok(Some(session)) => {
                println!("User id:    {}", session.user_id);
                println!("Role:       {}", session.role);
                println!(
                    "Department: {}",
                    session.department.as_deref().unwrap_or("(none)")
                );
                println!("Shell session: {}", ctx.session_id);
                println!("Activity log: {}", ctx.transcript.borrow().path.display());
            }
            _ => println!("You are signed out."),
        },
        _ => match Screen::from_command(cmd) {
            Some(screen) => handle_screen(ctx, rl, screen, args)?,
            None => println!("Unknown command: {}. Try /help.", cmd),
        },
    }
    Ok(false)
}

fn handle_screen(
    ctx: &Context,
    rl: &mut DefaultEditor,
    screen: Screen,
    args: &str,
) -> Result<()> {
    let Some(session) = current_session(ctx) else {
        return Ok(());
    };
    if !nav::is_visible(session.role, screen) {
        let _ = ctx
            .transcript
            .borrow_mut()
            .screen_denied(screen.command(), session.role.as_str());
        println!("{} is not available for your role.", screen.command());
        return Ok(());
    }
    let _ = ctx.transcript.borrow_mut().screen_opened(screen.command());

    match screen {
        Screen::AddValue => values::add_screen(ctx, rl, &session),
        Screen::UpdateValue => values::update_screen(ctx, rl, &session),
        Screen::Users => users::list_screen(ctx),
        Screen::CreateUser => users::create_screen(ctx, rl),
        Screen::Departments => departments::screen(ctx, rl, args),
        Screen::Indicators => indicators::screen(ctx, rl, args),
        Screen::CreateIndicator => indicators::create_screen(ctx, rl),
        Screen::History => history::screen(ctx, args),
        Screen::Profile => users::profile_screen(ctx, rl, &session),
        Screen::Chat => chat::screen(ctx, args),
    }
}

fn print_help(ctx: &Context) {
    println!("Account:");
    println!("  /login            - sign in");
    println!("  /logout           - sign out (clears the saved session)");
    println!("  /password         - change your password");
    println!("  /forgot-password  - request and apply a reset code");
    println!("  /whoami           - show the saved session");
    println!("  /exit             - quit");

    match ctx.store.load() {
        Ok(Some(session)) => {
            println!("Screens ({}):", session.role);
            for screen in nav::visible_screens(session.role) {
                println!("  {:<18} - {}", screen.command(), screen.describe());
            }
        }
        _ => println!("Sign in to see the screens available to your role."),
    }
}
