// Entry point and terminal presentation.
//
// The library computes every view; this binary loads the CSV once per
// session, keeps the current view and filter selection, and prints the
// rendered tables. The `dashboard` command is a small menu loop standing in
// for the web page: the home view offers the filter controls and the
// "view analyses" button, the analysis view offers "return home".
mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, warn};
use std::io::{self, Write};
use std::path::Path;

use cli::{Args, Commands};
use unidata::aggregate::{count_by, cross_tab, top_k};
use unidata::config::ProfileConfig;
use unidata::loader::{self, MalformedRows};
use unidata::output;
use unidata::render::{self, Action, AnalysisView, HomeView, Rendered, Selection, View};
use unidata::series::{build_series, SeriesFilter, SeriesOutcome};
use unidata::summary::SummaryStats;
use unidata::types::{ClaimTable, Eligibility};
use unidata::util::{format_count, format_number};

/// Everything one dashboard session holds between interactions.
struct Session {
    table: ClaimTable,
    profiles: ProfileConfig,
    view: View,
    selection: Selection,
}

fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn print_summary(summary: &SummaryStats) {
    println!("Impressões Iniciais\n");
    println!("- Quantidade de Sinistros na base: {}", format_count(summary.total_claims));
    println!(
        "- Quantidade de Pessoas que ativaram o sinistro: {}",
        format_count(summary.distinct_claimants)
    );
    match &summary.claims_per_claimant {
        Ok(v) => println!("- Quantidade Média de Sinistro por Pessoa: {}", format_number(*v, 2)),
        Err(e) => println!("- Quantidade Média de Sinistro por Pessoa: indefinida ({})", e),
    }
    match summary.max_paid {
        Some(v) => println!("- Máximo Valor Pago: R${}", format_number(v, 2)),
        None => println!("- Máximo Valor Pago: -"),
    }
    println!(
        "- Prestador Mais Frequente: {}\n",
        summary.top_provider.as_deref().unwrap_or("-")
    );
}

fn print_series(title: &str, outcome: &SeriesOutcome) {
    match outcome {
        SeriesOutcome::NoSelection => println!("{}\n\n(selecione ao menos uma elegibilidade)\n", title),
        SeriesOutcome::Series(buckets) if buckets.iter().all(|b| b.count == 0) => {
            println!("{}\n\nNão há dados disponíveis para estes parâmetros\n", title)
        }
        SeriesOutcome::Series(buckets) => output::print_table(title, buckets),
    }
}

fn print_home(home: &HomeView) {
    print_summary(&home.summary);
    output::print_table("Distribuição de Sexo por Sinistro", &home.sex);
    output::print_table("Distribuição de Elegibilidade por Sinistro", &home.eligibility);
    output::print_table("Distribuição por Faixa Etária e Gênero", &home.age_by_sex);
    output::print_table("Número de Ocorrências por Mês", &home.monthly);
    for top in &home.top_by_eligibility {
        output::print_table(
            &format!("Top 3 Categorias mais utilizadas por {}", top.eligibility),
            &top.categories,
        );
        output::print_table(
            &format!("Top 3 Prestadores mais utilizados por {}", top.eligibility),
            &top.providers,
        );
    }
    let series = &home.category_series;
    let labels: Vec<&str> = series.eligibility.iter().map(|e| e.label()).collect();
    print_series(
        &format!(
            "Número de Ocorrências de {} por Mês ({})",
            series.category.as_deref().unwrap_or("-"),
            labels.join(", ")
        ),
        &series.outcome,
    );
}

fn print_analysis(analysis: &AnalysisView) {
    println!("Nossas Análises\n");
    for p in &analysis.profiles {
        if let Some(desc) = &p.description {
            println!("- Perfil {}: {}", p.rank, desc);
        }
    }
    println!();
    output::print_table("Distribuição de Ocorrências e Segurados por Perfil", &output::profile_rows(analysis));
    output::print_table(
        "Distribuição de Categorias por Perfil",
        &output::profile_top_rows(analysis, false),
    );
    output::print_table(
        "Distribuição de Prestadores por Perfil",
        &output::profile_top_rows(analysis, true),
    );
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_session(args: &Args) -> Result<Session> {
    let mode = if args.skip_malformed {
        MalformedRows::Skip
    } else {
        MalformedRows::Abort
    };
    let (table, report) = loader::load_path(&args.input, mode)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    println!(
        "Processing dataset... ({} rows read, {} loaded)",
        format_count(report.total_rows),
        format_count(report.loaded_rows)
    );
    if report.skipped_rows > 0 {
        println!(
            "Note: {} rows skipped due to parse/validation errors (first: {}).",
            format_count(report.skipped_rows),
            report.first_error.as_deref().unwrap_or("-")
        );
    }
    println!();

    let profiles = match &args.profiles {
        Some(path) => ProfileConfig::load(path)
            .with_context(|| format!("failed to read profile table {}", path.display()))?,
        None => ProfileConfig::default(),
    };
    Ok(Session {
        table,
        profiles,
        view: View::default(),
        selection: Selection::default(),
    })
}

fn choose_eligibility(session: &mut Session) {
    println!("Escolha a Elegibilidade (ex.: 1,2; vazio para nenhuma):");
    for (i, e) in Eligibility::ALL.iter().enumerate() {
        println!("[{}] {}", i + 1, e);
    }
    let Some(line) = read_line("Enter choice: ") else { return };
    let mut chosen = Vec::new();
    for part in line.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let picked = part
            .parse::<usize>()
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| Eligibility::ALL.get(i).copied());
        match picked {
            Some(e) if !chosen.contains(&e) => chosen.push(e),
            Some(_) => {}
            None => {
                println!("Invalid choice: {}\n", part);
                return;
            }
        }
    }
    session.selection.eligibility = Some(chosen);
}

fn choose_category(session: &mut Session) {
    let options = unidata::series::category_options(&session.table);
    println!("Selecione uma Categoria:");
    for (i, c) in options.iter().enumerate() {
        println!("[{}] {}", i + 1, c);
    }
    let Some(line) = read_line("Enter choice: ") else { return };
    match line.parse::<usize>().ok().and_then(|i| i.checked_sub(1)).and_then(|i| options.get(i)) {
        Some(c) => session.selection.category = Some(c.clone()),
        None => println!("Invalid choice.\n"),
    }
}

fn run_dashboard(mut session: Session) {
    loop {
        match render::render(session.view, &session.table, &session.selection, &session.profiles) {
            Ok(Rendered::Home(home)) => print_home(&home),
            Ok(Rendered::Analysis(analysis)) => print_analysis(&analysis),
            Err(e) => {
                error!("render failed: {}", e);
                println!("Dados não disponíveis: {}\n", e);
            }
        }

        match session.view {
            View::Home => {
                println!("[1] Escolha a Elegibilidade");
                println!("[2] Selecione uma Categoria");
                println!("[3] Veja Nossas Análises");
                println!("[q] Sair\n");
                match read_line("Enter choice: ").as_deref() {
                    Some("1") => choose_eligibility(&mut session),
                    Some("2") => choose_category(&mut session),
                    Some("3") => session.view = session.view.apply(Action::ViewAnalyses),
                    Some("q") | None => break,
                    Some(_) => println!("Invalid choice. Please enter 1, 2, 3 or q.\n"),
                }
            }
            View::Analysis => {
                println!("[1] Voltar para Home");
                println!("[q] Sair\n");
                match read_line("Enter choice: ").as_deref() {
                    Some("1") => session.view = session.view.apply(Action::ReturnHome),
                    Some("q") | None => break,
                    Some(_) => println!("Invalid choice. Please enter 1 or q.\n"),
                }
            }
        }
    }
    println!("Exiting the program.");
}

fn export(session: &Session, out: &Path) -> Result<()> {
    std::fs::create_dir_all(out).with_context(|| format!("failed to create {}", out.display()))?;
    let home = render::render_home(&session.table, &session.selection);
    let mut files = output::export_home(out, &home)?;
    match render::render_analysis(&session.table, &session.profiles) {
        Ok(analysis) => files.extend(output::export_analysis(out, &analysis)?),
        Err(e) => warn!("skipping profile export: {}", e),
    }
    output::export_normalized(&out.join("normalized.csv"), &session.table)?;
    files.push("normalized.csv".to_string());
    println!("Outputs saved to {}:", out.display());
    for f in files {
        println!("  {}", f);
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let session = load_session(&args)?;
    match args.command.unwrap_or(Commands::Dashboard) {
        Commands::Dashboard => run_dashboard(session),
        Commands::Summary { json } => {
            let summary = unidata::summary::summarize(&session.table);
            if json {
                print_json(&summary)?;
            } else {
                print_summary(&summary);
            }
        }
        Commands::Home {
            eligibility,
            category,
            json,
        } => {
            let selection = Selection {
                eligibility: if eligibility.is_empty() {
                    None
                } else {
                    Some(eligibility.into_iter().map(Eligibility::from).collect())
                },
                category,
            };
            let home = render::render_home(&session.table, &selection);
            if json {
                print_json(&Rendered::Home(home))?;
            } else {
                print_home(&home);
            }
        }
        Commands::Analysis { json } => {
            let analysis = render::render_analysis(&session.table, &session.profiles)?;
            if json {
                print_json(&Rendered::Analysis(analysis))?;
            } else {
                print_analysis(&analysis);
            }
        }
        Commands::Series { eligibility, category } => {
            let filter = SeriesFilter {
                eligibility: eligibility.into_iter().map(Eligibility::from).collect(),
                category,
            };
            let title = format!("Número de Ocorrências de {} por Mês", filter.category);
            print_series(&title, &build_series(&session.table, &filter));
        }
        Commands::Aggregate { dimension, by, top } => match by {
            Some(secondary) => {
                let rows = cross_tab(session.table.records(), dimension, secondary);
                output::print_table(&format!("{} x {}", dimension.column(), secondary.column()), &rows);
            }
            None => {
                let mut rows = count_by(session.table.records(), dimension);
                if let Some(k) = top {
                    rows = top_k(rows, k);
                }
                output::print_table(dimension.column(), &rows);
            }
        },
        Commands::Export { out } => export(&session, &out)?,
    }
    Ok(())
}
