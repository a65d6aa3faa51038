use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};

mod cli;
mod cmd_backup;
mod cmd_checkpoint;
mod cmd_destroy;
mod cmd_records;
mod cmd_search;
mod cmd_shell;
mod cmd_status;

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт - warn (не мешает выводу команд).
    Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    match cli.cmd {
        cli::Cmd::AddBook { path, title, author_id, qty } =>
            cmd_records::exec_add_book(path, title, author_id, qty),

        cli::Cmd::AddAuthor { path, name, country } =>
            cmd_records::exec_add_author(path, name, country),

        cli::Cmd::UpdateBook { path, id, field, value } =>
            cmd_records::exec_update_book(path, id, field, value),

        cli::Cmd::DeleteBook { path, id } =>
            cmd_records::exec_delete_book(path, id),

        cli::Cmd::Search { path, by, value, json } =>
            cmd_search::exec_search(path, by, value, json),

        cli::Cmd::Details { path, json } =>
            cmd_search::exec_details(path, json),

        cli::Cmd::Backup { path } =>
            cmd_backup::exec_backup(path),

        cli::Cmd::Restore { path } =>
            cmd_backup::exec_restore(path),

        cli::Cmd::Checkpoint { path } =>
            cmd_checkpoint::exec(path),

        cli::Cmd::Status { path, json } =>
            cmd_status::exec_with_json(path, json),

        cli::Cmd::Destroy { path, yes } =>
            cmd_destroy::exec(path, yes),

        cli::Cmd::Shell { path } =>
            cmd_shell::exec(path),
    }
}
