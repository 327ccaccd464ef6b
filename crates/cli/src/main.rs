// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hive`: the CLI surface for every human- and agent-facing command in
//! spec.md §6. Dispatch is a flat match over [`Commands`] — there is no
//! shared "run a command" trait, matching how small this repo's command set
//! stays relative to the daemon's tick pipeline.

mod color;
mod commands;
mod context;
mod exit_error;
mod output;
mod providers;

use clap::{Parser, Subcommand};
use exit_error::ExitError;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "hive", version, about = "Multi-agent software development orchestrator", styles = color::styles())]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new hive workspace.
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Register a repository and the team that owns it.
    AddRepo {
        url: String,
        #[arg(long = "team")]
        team_name: String,
        #[arg(long)]
        branch: Option<String>,
    },
    /// Submit a new requirement (text or a PM issue URL) for planning.
    Req {
        text_or_url: String,
        #[arg(long)]
        godmode: bool,
    },
    /// Submit a requirement's planning output (stories + dependencies).
    Plan {
        requirement_id: String,
        #[arg(long)]
        session: Option<String>,
    },
    /// Assign planned stories to available agents.
    Assign {
        #[arg(long)]
        dry_run: bool,
    },
    /// Pull request lifecycle.
    Pr {
        #[command(subcommand)]
        command: PrCommands,
    },
    /// An agent session's own assigned stories.
    MyStories {
        session: Option<String>,
        #[arg(long)]
        all: bool,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
        #[command(subcommand)]
        command: Option<MyStoriesCommands>,
    },
    /// Escalations raised by the daemon or by agents.
    Approvals {
        #[command(subcommand)]
        command: ApprovalsCommands,
    },
    /// Register PM/VCS provider credentials.
    Auth {
        provider: Option<String>,
    },
    /// Generic project-management provider queries.
    Pm {
        #[command(subcommand)]
        command: PmCommands,
    },
    /// Jira-specific aliases of `hive pm`.
    Jira {
        #[command(subcommand)]
        command: PmCommands,
    },
    /// Control the Manager Daemon process.
    Manager {
        #[command(subcommand)]
        command: ManagerCommands,
    },
    /// Reconcile orphaned worktrees, locks, sessions, and assignments.
    Cleanup {
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        force: bool,
        #[arg(long)]
        worktrees: bool,
        #[arg(long)]
        locks: bool,
        #[arg(long)]
        sessions: bool,
        #[arg(long)]
        assignments: bool,
    },
    /// Narrate in-flight work on an assigned story.
    Progress {
        story_id: String,
        #[arg(short, long)]
        message: String,
        #[arg(long)]
        done: bool,
        #[arg(long)]
        session: Option<String>,
    },
    /// Declare an intended approach before starting a story.
    Approach {
        story_id: String,
        #[arg(short, long)]
        message: String,
        #[arg(long)]
        session: Option<String>,
    },
    /// Raise an escalation from the calling agent session.
    Escalate {
        #[arg(short, long)]
        message: String,
        #[arg(long)]
        story: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        session: Option<String>,
    },
    /// Direct session-to-session messaging.
    Msg {
        #[command(subcommand)]
        command: MsgCommands,
    },
    /// Read-only rollup of teams, stories, merge queue, and escalations.
    Status {
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Query the append-only log table.
    Logs {
        #[arg(long)]
        agent: Option<String>,
        #[arg(long)]
        story: Option<String>,
        #[arg(long)]
        since: Option<u64>,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum PrCommands {
    Submit { story_id: String, #[arg(long = "agent")] agent_id: String },
    Queue { #[arg(long)] all: bool, #[arg(long, value_enum, default_value = "text")] format: OutputFormat },
    Show { pr_id: String, #[arg(long, value_enum, default_value = "text")] format: OutputFormat },
    Review { pr_id: String, #[arg(long = "reviewer")] reviewer_agent_id: String },
    Approve { pr_id: String, #[arg(long = "reviewer")] reviewer_agent_id: String, #[arg(short, long)] notes: Option<String> },
    Reject { pr_id: String, #[arg(long = "reviewer")] reviewer_agent_id: String, #[arg(short, long)] notes: String },
    Sync,
}

#[derive(Subcommand)]
enum MyStoriesCommands {
    Claim { story_id: String, #[arg(long)] session: Option<String> },
    Complete { story_id: String, #[arg(long)] session: Option<String> },
    Refactor { story_id: String, #[arg(long)] session: Option<String>, #[arg(short, long)] message: String },
}

#[derive(Subcommand)]
enum ApprovalsCommands {
    List { #[arg(long)] all: bool, #[arg(long, value_enum, default_value = "text")] format: OutputFormat },
    Show { escalation_id: String, #[arg(long, value_enum, default_value = "text")] format: OutputFormat },
    Approve { escalation_id: String, #[arg(long, default_value_t = String::new())] resolution: String },
    Deny { escalation_id: String, #[arg(long, default_value_t = String::new())] resolution: String },
}

#[derive(Subcommand)]
enum PmCommands {
    Search { #[arg(long = "project")] project_key: String, query: String },
    Get { issue_key: String },
    Comment { issue_key: String, #[arg(long)] event: String, #[arg(long = "context")] context_text: String },
}

#[derive(Subcommand)]
enum ManagerCommands {
    Start,
    Stop,
    Status { #[arg(short, long)] verbose: bool },
}

#[derive(Subcommand)]
enum MsgCommands {
    Send { session: String, #[arg(short, long)] message: String },
    Outbox { session: Option<String>, #[arg(long, default_value_t = 0)] lines: usize },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(hive_daemon::env::log_filter()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = dispatch(cli.command).await {
        output::print_failure_line(&err.message);
        std::process::exit(err.code);
    }
}

async fn dispatch(command: Commands) -> Result<(), ExitError> {
    match command {
        Commands::Init { force } => commands::init::run(force),
        Commands::AddRepo { url, team_name, branch } => commands::add_repo::run(url, team_name, branch),
        Commands::Req { text_or_url, godmode } => commands::req::run(text_or_url, godmode).await,
        Commands::Plan { requirement_id, session } => commands::plan::run(requirement_id, session),
        Commands::Assign { dry_run } => commands::assign::run(dry_run).await,
        Commands::Pr { command } => dispatch_pr(command).await,
        Commands::MyStories { session, all, format, command } => match command {
            None => commands::my_stories::list(session, all, format),
            Some(MyStoriesCommands::Claim { story_id, session }) => commands::my_stories::claim(story_id, session),
            Some(MyStoriesCommands::Complete { story_id, session }) => commands::my_stories::complete(story_id, session),
            Some(MyStoriesCommands::Refactor { story_id, session, message }) => commands::my_stories::refactor(story_id, session, message),
        },
        Commands::Approvals { command } => dispatch_approvals(command),
        Commands::Auth { provider } => commands::auth::run(provider),
        Commands::Pm { command } => dispatch_pm(command, false).await,
        Commands::Jira { command } => dispatch_pm(command, true).await,
        Commands::Manager { command } => match command {
            ManagerCommands::Start => commands::manager::start().await,
            ManagerCommands::Stop => commands::manager::stop().await,
            ManagerCommands::Status { verbose } => commands::manager::status(verbose).await,
        },
        Commands::Cleanup { dry_run, force, worktrees, locks, sessions, assignments } => {
            commands::cleanup::run(dry_run, force, worktrees, locks, sessions, assignments).await
        }
        Commands::Progress { story_id, message, done, session } => commands::progress::run(story_id, message, done, session),
        Commands::Approach { story_id, message, session } => commands::approach::run(story_id, message, session),
        Commands::Escalate { message, story, to, session } => commands::escalate::run(message, story, to, session),
        Commands::Msg { command } => match command {
            MsgCommands::Send { session, message } => commands::msg::send(session, message).await,
            MsgCommands::Outbox { session, lines } => commands::msg::outbox(session, lines).await,
        },
        Commands::Status { format } => commands::status::run(format),
        Commands::Logs { agent, story, since, limit } => commands::logs::run(agent, story, since, limit),
    }
}

async fn dispatch_pr(command: PrCommands) -> Result<(), ExitError> {
    match command {
        PrCommands::Submit { story_id, agent_id } => commands::pr::submit(story_id, agent_id).await,
        PrCommands::Queue { all, format } => commands::pr::queue(all, format),
        PrCommands::Show { pr_id, format } => commands::pr::show(pr_id, format),
        PrCommands::Review { pr_id, reviewer_agent_id } => commands::pr::review(pr_id, reviewer_agent_id).await,
        PrCommands::Approve { pr_id, reviewer_agent_id, notes } => commands::pr::approve(pr_id, reviewer_agent_id, notes).await,
        PrCommands::Reject { pr_id, reviewer_agent_id, notes } => commands::pr::reject(pr_id, reviewer_agent_id, notes).await,
        PrCommands::Sync => commands::pr::sync().await,
    }
}

fn dispatch_approvals(command: ApprovalsCommands) -> Result<(), ExitError> {
    match command {
        ApprovalsCommands::List { all, format } => commands::approvals::list(all, format),
        ApprovalsCommands::Show { escalation_id, format } => commands::approvals::show(escalation_id, format),
        ApprovalsCommands::Approve { escalation_id, resolution } => commands::approvals::approve(escalation_id, resolution),
        ApprovalsCommands::Deny { escalation_id, resolution } => commands::approvals::deny(escalation_id, resolution),
    }
}

async fn dispatch_pm(command: PmCommands, jira: bool) -> Result<(), ExitError> {
    match (command, jira) {
        (PmCommands::Search { project_key, query }, false) => commands::pm::search(project_key, query).await,
        (PmCommands::Search { project_key, query }, true) => commands::jira::search(project_key, query).await,
        (PmCommands::Get { issue_key }, false) => commands::pm::get(issue_key).await,
        (PmCommands::Get { issue_key }, true) => commands::jira::get(issue_key).await,
        (PmCommands::Comment { issue_key, event, context_text }, false) => commands::pm::comment(issue_key, event, context_text).await,
        (PmCommands::Comment { issue_key, event, context_text }, true) => commands::jira::comment(issue_key, event, context_text).await,
    }
}
