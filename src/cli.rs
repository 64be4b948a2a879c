use crate::{
    config::Config,
    directory::{Directory, User},
    feedback::Feedback,
    transcript::Transcript,
    validate, Args,
};
use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::cell::RefCell;

pub struct Context {
    pub args: Args,
    pub session_id: String,
    pub config: Config,
    pub directory: RefCell<Directory>,
    pub transcript: RefCell<Transcript>,
}

/// Execute a single command line and return (one-shot `-c` mode).
pub fn run_once(ctx: &Context, line: &str, feedback: &dyn Feedback) -> Result<()> {
    handle_command(ctx, line, feedback);
    Ok(())
}

pub fn run_repl(ctx: Context, feedback: &dyn Feedback) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!(
        "roster - {} users loaded. Type 'help' for commands, 'exit' to quit.",
        ctx.directory.borrow().len()
    );

    loop {
        match rl.readline("roster> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;

                if handle_command(&ctx, line, feedback) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {}", e);
                break;
            }
        }
    }

    let count = ctx.directory.borrow().len();
    if let Err(e) = ctx.transcript.borrow_mut().session_end(count) {
        eprintln!("Warning: failed to log session end: {}", e);
    }

    Ok(())
}

/// Dispatch one command line. Returns true when the session should end.
fn handle_command(ctx: &Context, line: &str, feedback: &dyn Feedback) -> bool {
    let words = match shell_words::split(line) {
        Ok(words) => words,
        Err(e) => {
            println!("Parse error: {}", e);
            return false;
        }
    };
    let Some(command) = words.first() else {
        return false;
    };
    let rest = &words[1..];

    match command.as_str() {
        "exit" | "quit" => return true,
        "help" => {
            println!("Commands:");
            println!("  list                    - show all users");
            println!("  add <name> <email>      - add a user");
            println!("  edit <id> <name> <email> - change a user's name and email");
            println!("  rm <id>                 - delete a user");
            println!("  search <query>          - filter users by name or email");
            println!("  show <id>               - show one user in detail");
            println!("  stats                   - directory summary");
            println!("  session                 - show session info");
            println!("  help                    - show commands");
            println!("  exit                    - quit (the directory is not persisted)");
            println!();
            println!("Quote names containing spaces: add \"Ann Lee\" ann@example.com");
        }
        "list" => {
            let dir = ctx.directory.borrow();
            render_table(dir.users().iter());
        }
        "add" => {
            cmd_add(ctx, rest, feedback);
        }
        "edit" => {
            cmd_edit(ctx, rest, feedback);
        }
        "rm" | "delete" => {
            cmd_remove(ctx, rest, feedback);
        }
        "search" | "find" => {
            cmd_search(ctx, rest);
        }
        "show" => match parse_id(rest.first()) {
            Some(id) => {
                let dir = ctx.directory.borrow();
                match dir.get(id) {
                    Some(user) => render_detail(user),
                    None => println!("No user with id {}", id),
                }
            }
            None => println!("Usage: show <id>"),
        },
        "stats" => {
            let dir = ctx.directory.borrow();
            println!("Total users: {}", dir.len());
            if let Some(max) = dir.users().iter().map(|u| u.id).max() {
                println!("Highest id:  {}", max);
            }
        }
        "session" => {
            println!("Session: {}", ctx.session_id);
            println!("Transcript: {:?}", ctx.transcript.borrow().path);
            println!("Latency: {}ms", ctx.config.latency_ms);
        }
        _ => println!("Unknown command: {} (try 'help')", command),
    }
    false
}

fn cmd_add(ctx: &Context, args: &[String], feedback: &dyn Feedback) {
    let [name, email] = args else {
        println!("Usage: add <name> <email>");
        return;
    };

    let v = validate::validate(name, email);
    if !v.is_ok() {
        report_validation(&v);
        if let Err(e) = ctx.transcript.borrow_mut().validation_failed("add", &v) {
            eprintln!("Warning: transcript write failed: {}", e);
        }
        return;
    }

    feedback.working("Adding user");
    feedback.pause();

    let user = ctx
        .directory
        .borrow_mut()
        .add(validate::UserInput::new(name, email));
    if let Err(e) = ctx.transcript.borrow_mut().user_added(&user) {
        eprintln!("Warning: transcript write failed: {}", e);
    }
    feedback.success(&format!(
        "User added successfully: [{}] {} <{}>",
        user.id, user.name, user.email
    ));
}

fn cmd_edit(ctx: &Context, args: &[String], feedback: &dyn Feedback) {
    let [id, name, email] = args else {
        println!("Usage: edit <id> <name> <email>");
        return;
    };
    let Some(id) = parse_id(Some(id)) else {
        println!("Invalid id: {}", id);
        return;
    };

    let v = validate::validate(name, email);
    if !v.is_ok() {
        report_validation(&v);
        if let Err(e) = ctx.transcript.borrow_mut().validation_failed("edit", &v) {
            eprintln!("Warning: transcript write failed: {}", e);
        }
        return;
    }

    feedback.working("Updating user");
    feedback.pause();

    let result = ctx
        .directory
        .borrow_mut()
        .update(id, validate::UserInput::new(name, email));
    match result {
        Ok(user) => {
            if let Err(e) = ctx.transcript.borrow_mut().user_updated(&user) {
                eprintln!("Warning: transcript write failed: {}", e);
            }
            feedback.success(&format!(
                "User updated successfully: [{}] {} <{}>",
                user.id, user.name, user.email
            ));
        }
        Err(e) => println!("Error: {}", e),
    }
}

fn cmd_remove(ctx: &Context, args: &[String], feedback: &dyn Feedback) {
    let Some(id) = parse_id(args.first()) else {
        println!("Usage: rm <id>");
        return;
    };

    let removed = ctx.directory.borrow_mut().remove(id);
    if let Err(e) = ctx.transcript.borrow_mut().user_removed(id, removed) {
        eprintln!("Warning: transcript write failed: {}", e);
    }
    if removed {
        feedback.success(&format!("User {} deleted successfully", id));
    } else {
        println!("No user with id {} (nothing to delete)", id);
    }
}

fn cmd_search(ctx: &Context, args: &[String]) {
    let query = args.join(" ");
    let dir = ctx.directory.borrow();
    let hits = dir.search(&query);
    if let Err(e) = ctx.transcript.borrow_mut().search(&query, hits.len()) {
        eprintln!("Warning: transcript write failed: {}", e);
    }

    if hits.is_empty() {
        println!("No users matching {:?}", query);
    } else {
        if !query.trim().is_empty() {
            println!("Found {} user(s) matching {:?}:", hits.len(), query);
        }
        render_table(hits.into_iter());
    }
}

fn parse_id(arg: Option<&String>) -> Option<u64> {
    arg.and_then(|s| s.parse::<u64>().ok()).filter(|id| *id > 0)
}

fn report_validation(v: &validate::Validation) {
    if let Some(e) = v.name_error {
        println!("  name:  {}", e.message());
    }
    if let Some(e) = v.email_error {
        println!("  email: {}", e.message());
    }
}

fn render_table<'a>(users: impl Iterator<Item = &'a User>) {
    let mut count = 0;
    println!("{:>4}  {:<3} {:<20} {}", "ID", "", "NAME", "EMAIL");
    for user in users {
        println!(
            "{:>4}  {:<3} {:<20} {}",
            user.id, user.avatar, user.name, user.email
        );
        count += 1;
    }
    if count == 0 {
        println!("  (no users)");
    }
}

fn render_detail(user: &User) {
    println!("Id:     {}", user.id);
    println!("Name:   {}", user.name);
    println!("Email:  {}", user.email);
    println!("Avatar: {}", user.avatar);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::SilentFeedback;
    use clap::Parser;

    fn test_context(tmp: &tempfile::TempDir) -> Context {
        let config = Config::default();
        let directory = Directory::with_seed(config.seed_users());
        let transcript =
            Transcript::new(&tmp.path().join("session.jsonl"), "test-session").unwrap();
        Context {
            args: Args::parse_from(["roster"]),
            session_id: "test-session".to_string(),
            config,
            directory: RefCell::new(directory),
            transcript: RefCell::new(transcript),
        }
    }

    #[test]
    fn test_add_command_commits_valid_input() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = test_context(&tmp);

        handle_command(&ctx, "add \"Ann Lee\" ann@example.com", &SilentFeedback);

        let dir = ctx.directory.borrow();
        assert_eq!(dir.len(), 5);
        let added = dir.get(5).unwrap();
        assert_eq!(added.name, "Ann Lee");
        assert_eq!(added.email, "ann@example.com");
    }

    #[test]
    fn test_add_command_refuses_invalid_email() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = test_context(&tmp);

        handle_command(&ctx, "add Ann not-an-email", &SilentFeedback);

        // Commit refused, state unchanged.
        assert_eq!(ctx.directory.borrow().len(), 4);

        let log = std::fs::read_to_string(&ctx.transcript.borrow().path).unwrap();
        assert!(log.contains("validation_failed"));
    }

    #[test]
    fn test_edit_command_updates_target() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = test_context(&tmp);

        handle_command(&ctx, "edit 2 Rahul rahul@example.org", &SilentFeedback);

        let dir = ctx.directory.borrow();
        assert_eq!(dir.get(2).unwrap().email, "rahul@example.org");
        assert_eq!(dir.len(), 4);
    }

    #[test]
    fn test_edit_unknown_id_leaves_state_unchanged() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = test_context(&tmp);

        handle_command(&ctx, "edit 42 Nobody nobody@example.com", &SilentFeedback);

        assert_eq!(ctx.directory.borrow().len(), 4);
        assert!(ctx.directory.borrow().get(42).is_none());
    }

    #[test]
    fn test_rm_command_tolerates_unknown_id() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = test_context(&tmp);

        handle_command(&ctx, "rm 3", &SilentFeedback);
        assert_eq!(ctx.directory.borrow().len(), 3);

        // Second delete of the same id is a quiet no-op.
        handle_command(&ctx, "rm 3", &SilentFeedback);
        assert_eq!(ctx.directory.borrow().len(), 3);
    }

    #[test]
    fn test_exit_command_ends_session() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = test_context(&tmp);
        assert!(handle_command(&ctx, "exit", &SilentFeedback));
        assert!(handle_command(&ctx, "quit", &SilentFeedback));
        assert!(!handle_command(&ctx, "list", &SilentFeedback));
    }

    #[test]
    fn test_search_command_logs_hits() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = test_context(&tmp);

        handle_command(&ctx, "search priya", &SilentFeedback);

        let log = std::fs::read_to_string(&ctx.transcript.borrow().path).unwrap();
        let event: serde_json::Value =
            serde_json::from_str(log.lines().next().unwrap()).unwrap();
        assert_eq!(event["type"], "search");
        assert_eq!(event["query"], "priya");
        assert_eq!(event["hits"], 1);
    }
}
