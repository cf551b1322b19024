use super::*;
use chanscout_pipeline::{CallCategory, QuotaLedger};

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["chanscout", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["chanscout", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["chanscout"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn discover_defaults_to_writing() {
    let cli = Cli::try_parse_from(["chanscout", "discover"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Discover { dry_run: false })
    ));
}

#[test]
fn discover_dry_run_flag() {
    let cli = Cli::try_parse_from(["chanscout", "discover", "--dry-run"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Discover { dry_run: true })
    ));
}

#[test]
fn add_takes_identifier() {
    let cli = Cli::try_parse_from(["chanscout", "add", "@maker"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Add { ref identifier }) if identifier == "@maker"
    ));
}

#[test]
fn add_requires_identifier() {
    assert!(Cli::try_parse_from(["chanscout", "add"]).is_err());
}

#[test]
fn parses_schedule_command() {
    let cli = Cli::try_parse_from(["chanscout", "schedule"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Schedule)));
}

#[test]
fn runs_limit_defaults_to_twenty() {
    let cli = Cli::try_parse_from(["chanscout", "runs"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Runs { limit: 20 })));
}

#[test]
fn quota_limit_is_configurable() {
    let cli = Cli::try_parse_from(["chanscout", "quota", "--limit", "5"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Quota { limit: 5 })));
}

#[test]
fn unknown_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["chanscout", "collect"]).is_err());
}

#[test]
fn quota_entries_follow_ledger() {
    let mut ledger = QuotaLedger::new();
    ledger.record(CallCategory::Search);
    ledger.record(CallCategory::Search);
    ledger.record(CallCategory::VideoStats);

    let entries = quota_entries(&ledger);

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].category, "search");
    assert_eq!(entries[0].calls, 2);
    assert_eq!(entries[0].units, 200);
    assert_eq!(entries[1].category, "video_stats");
    assert_eq!(entries[1].units, 1);
}
