use anyhow::{anyhow, bail, ensure, Context as _, Result};
use ariadne::{Color, Fmt as _, Label, Report, ReportKind, Source};
use console::{pad_str, style, Alignment, StyledObject};
use std::collections::BTreeMap;
use std::path::Path;

use crate::accounts::{AccountTree, MappedAccount, MappingSource, NodeId};
use crate::args::{Args, Command};
use crate::backend::OfflineBackend;
use crate::config::{prompt_edit_config, Config};
use crate::ledger::{self, Ledger, SkippedLine};
use crate::migration::{
    AccountOutcome, MigrationReport, Migrator, Mode, Summary, TransactionOutcome,
};
use crate::normalize::NormalizedJournalLine;
use crate::terminal::{self, BulletPointPrinter};

pub async fn main(args: Args) -> Result<()> {
    match args.command {
        Command::Plan { config, ledger } => main_plan(&config, &ledger).await,
        Command::Accounts { config, ledger } => main_accounts(&config, &ledger).await,
        Command::Check { ledger } => main_check(&ledger).await,
        Command::InitConfig {
            company,
            suffix,
            ledger,
            output,
        } => main_init_config(company, suffix, &ledger, &output).await,
    }
}

async fn main_plan(config_path: &Path, ledger_path: &Path) -> Result<()> {
    let config = Config::load(config_path).await?;
    let mut options = config.migration_options();
    if options.mode == Mode::Live {
        log::warn!("The command line has no backend connection, doing a dry run instead");
        options.mode = Mode::DryRun;
    }
    let migrator = Migrator::new(
        OfflineBackend,
        config.mapper(),
        &config.company,
        &config.base_currency,
        options,
    );
    let report = migrator.migrate_file(ledger_path).await?;
    print_report(&report);

    ensure!(
        report.summary.error_count == 0,
        "{} transaction(s) can't be migrated",
        report.summary.error_count
    );
    Ok(())
}

async fn main_accounts(config_path: &Path, ledger_path: &Path) -> Result<()> {
    let config = Config::load(config_path).await?;
    let ledger = load_ledger(ledger_path).await?.1;
    let mapper = config.mapper();
    let tree = AccountTree::build(
        ledger
            .accounts
            .iter()
            .map(|account| mapper.map_account(account, &config.base_currency)),
    );

    println!("{}", style_header("Accounts:"));
    let printer = BulletPointPrinter::new_stdout();
    if tree.is_empty() {
        printer.print_item(style("(none)").italic());
    }
    // Top-level accounts grouped below the backend parent they'll be created in
    let mut roots_by_parent: BTreeMap<&str, Vec<NodeId>> = BTreeMap::new();
    for root in tree.roots() {
        roots_by_parent
            .entry(tree.node(*root).account.parent_target_identifier.as_str())
            .or_default()
            .push(*root);
    }
    for (parent, roots) in roots_by_parent {
        printer.print_item(style_parent(parent));
        let printer = printer.indent();
        for root in roots {
            tree.walk_subtree(root, |node, depth| {
                print_account(&printer.nested(depth), &node.account)
            });
        }
    }
    Ok(())
}

async fn main_check(ledger_path: &Path) -> Result<()> {
    let (content, ledger) = load_ledger(ledger_path).await?;
    let name = ledger_path.display().to_string();
    for skipped in &ledger.skipped {
        print_skipped_line(&name, &content, skipped)?;
    }

    println!("{}", style_header("Ledger:"));
    let printer = BulletPointPrinter::new_stdout();
    printer.print_item(format!("{} commodities", ledger.commodities.len()));
    printer.print_item(format!("{} accounts", ledger.accounts.len()));
    printer.print_item(format!("{} prices", ledger.prices.len()));
    printer.print_item(format!("{} transactions", ledger.transactions.len()));
    printer.print_item("Accounts used without an open directive:");
    printer.indent().print_items(
        ledger
            .undeclared_accounts()
            .into_iter()
            .map(|name| style(name).yellow()),
        style("(none)").italic(),
    );

    ensure!(
        ledger.skipped.is_empty(),
        "{} line(s) can't be migrated",
        ledger.skipped.len()
    );
    Ok(())
}

async fn main_init_config(
    company: Option<String>,
    suffix: Option<String>,
    ledger_path: &Path,
    output: &Path,
) -> Result<()> {
    if tokio::fs::try_exists(output).await? {
        bail!("Config file {} already exists", output.display());
    }
    let ledger = load_ledger(ledger_path).await?.1;
    let company = match company {
        Some(company) => company,
        None => terminal::prompt("Company name in the accounting backend")?,
    };
    let suffix = match suffix {
        Some(suffix) => suffix,
        None => terminal::prompt("Suffix for backend account names (e.g. company abbreviation)")?,
    };

    let config = prompt_edit_config(&Config::bootstrap(&company, &suffix, &ledger))?;
    config.save(output).await?;
    println!(
        "Wrote config for {} accounts to {}",
        config.account_mappings.len(),
        style(output.display()).cyan()
    );
    Ok(())
}

async fn load_ledger(path: &Path) -> Result<(String, Ledger)> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| anyhow!("Failed to read ledger file {}", path.display()))?;
    let ledger = ledger::parse(&content);
    Ok((content, ledger))
}

fn print_skipped_line(name: &str, content: &str, skipped: &SkippedLine) -> Result<()> {
    Report::build(ReportKind::Warning, (name, skipped.span.clone()))
        .with_message(format!(
            "Line {} can't be migrated",
            skipped.line_number
        ))
        .with_label(
            Label::new((name, skipped.span.clone()))
                .with_message(format!("{}", skipped.reason.describe().fg(Color::Yellow)))
                .with_color(Color::Yellow),
        )
        .finish()
        .eprint((name, Source::from(content)))
        .context("Failed to print diagnostic")
}

fn print_report(report: &MigrationReport) {
    println!("{}", style_header("Accounts:"));
    let printer = BulletPointPrinter::new_stdout();
    if report.accounts.is_empty() {
        printer.print_item(style("(none)").italic());
    }
    for account in &report.accounts {
        printer.nested(account.depth).print_item(format!(
            "{} {}",
            style_account_line(&account.account),
            style_account_outcome(&account.outcome)
        ));
    }

    println!();
    println!("{}", style_header("Journal entries:"));
    if report.transactions.is_empty() {
        printer.print_item(style("(none)").italic());
    }
    for transaction in &report.transactions {
        printer.print_item(format!(
            "{} {} {}",
            style_date(&transaction.date),
            style_description(&transaction.description),
            style_transaction_outcome(&transaction.outcome),
        ));
        let printer = printer.indent();
        for line in &transaction.lines {
            print_journal_line(&printer, line);
        }
    }

    if !report.skipped_lines.is_empty() {
        println!();
        println!("{}", style_header("Skipped lines:"));
        for skipped in &report.skipped_lines {
            printer.print_item(format!(
                "{} {} {}",
                style(format!("line {}:", skipped.line_number)).bold(),
                style(skipped.reason.describe()).yellow(),
                style(&skipped.content).dim(),
            ));
        }
    }

    println!();
    println!("{}", style_header("Summary:"));
    print_summary(&printer, &report.summary);
}

fn print_account(
    printer: &BulletPointPrinter<terminal::StdoutLineWriter>,
    account: &MappedAccount,
) {
    printer.print_item(style_account_line(account));
}

fn print_journal_line(
    printer: &BulletPointPrinter<terminal::StdoutLineWriter>,
    line: &NormalizedJournalLine,
) {
    let (side, amount) = if line.credit.is_zero() {
        (style("Dr").green(), line.debit)
    } else {
        (style("Cr").red(), line.credit)
    };
    let rate = line
        .exchange_rate
        .map(|rate| format!(" @ {rate}"))
        .unwrap_or_default();
    printer.print_item(format!(
        "{} {} {}{}",
        pad_str(&line.target_account, 40, Alignment::Left, None),
        side,
        pad_str(
            &style(format!("{} {}", amount, line.currency)).bold().to_string(),
            20,
            Alignment::Right,
            None
        ),
        style(rate).dim(),
    ));
}

fn print_summary(printer: &BulletPointPrinter<terminal::StdoutLineWriter>, summary: &Summary) {
    printer.print_item(format!("Journal entries created: {}", summary.created_count));
    printer.print_item(format!("Accounts created: {}", summary.accounts_created));
    let errors = format!("Errors: {}", summary.error_count);
    if summary.error_count > 0 {
        printer.print_item(style(errors).red().bold());
    } else {
        printer.print_item(style(errors).green());
    }
    printer.print_item(format!("Skipped lines: {}", summary.skipped_lines));
    printer.print_item(format!(
        "Lines without exchange rate: {}",
        summary.unresolved_rates
    ));
    if summary.cancelled {
        printer.print_item(style("Cancelled").yellow().bold());
    }
}

fn style_header(header: &str) -> StyledObject<&str> {
    style(header).bold().underlined()
}

fn style_parent(parent: &str) -> StyledObject<&str> {
    style(parent).cyan().bold()
}

fn style_account_line(account: &MappedAccount) -> String {
    let source = match &account.mapping_source {
        MappingSource::Exact => style(format!("({})", account.source_name)).dim(),
        MappingSource::Prefix(prefix) => {
            style(format!("({} via {})", account.source_name, prefix)).dim()
        }
        MappingSource::Derived => style(format!("({}, derived)", account.source_name)).dim(),
    };
    format!(
        "{} {} {}",
        style(&account.target_identifier).magenta(),
        style(format!("[{}, {}]", account.class, account.currency)).blue(),
        source
    )
}

fn style_account_outcome(outcome: &AccountOutcome) -> StyledObject<String> {
    match outcome {
        AccountOutcome::Planned => style("planned".to_string()).italic(),
        AccountOutcome::AlreadyExists => style("exists".to_string()).dim(),
        AccountOutcome::Created(id) => style(format!("created {id}")).green(),
        AccountOutcome::Duplicate => style("same as an earlier account".to_string()).dim(),
        AccountOutcome::Failed(error) => style(format!("failed: {error}")).red(),
    }
}

fn style_transaction_outcome(outcome: &TransactionOutcome) -> StyledObject<String> {
    match outcome {
        TransactionOutcome::Planned => style("planned".to_string()).italic(),
        TransactionOutcome::Created { entry, submitted } => {
            if *submitted {
                style(format!("submitted {entry}")).green()
            } else {
                style(format!("draft {entry}")).green()
            }
        }
        TransactionOutcome::Rejected(error) => style(format!("rejected: {error}")).red(),
        TransactionOutcome::Failed(error) => style(format!("failed: {error}")).red(),
        TransactionOutcome::SubmitFailed { entry, error } => {
            style(format!("draft {entry}, submit failed: {error}")).yellow()
        }
    }
}

fn style_date(date: &chrono::NaiveDate) -> StyledObject<String> {
    style(date.format("%Y-%m-%d").to_string())
}

fn style_description(description: &str) -> StyledObject<&str> {
    style(description).blue()
}
