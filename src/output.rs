use crate::error::Result;
use crate::render::{AnalysisView, HomeView};
use crate::series::SeriesOutcome;
use crate::types::{ClaimTable, ProfileRow, ProfileTopRow};
use log::info;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Serialize `rows` as one CSV file with a header line.
fn write_rows<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    rows.into_iter().try_for_each(|row| wtr.serialize(row))?;
    wtr.flush()?;
    Ok(())
}

/// An output directory that remembers which files were written to it.
struct ExportDir<'a> {
    dir: &'a Path,
    written: Vec<String>,
}

impl<'a> ExportDir<'a> {
    fn new(dir: &'a Path) -> Self {
        ExportDir { dir, written: Vec::new() }
    }

    fn csv<T: Serialize>(&mut self, name: &str, rows: impl IntoIterator<Item = T>) -> Result<()> {
        write_rows(&self.dir.join(name), rows)?;
        self.written.push(name.to_string());
        Ok(())
    }

    fn json<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> Result<()> {
        let mut file = BufWriter::new(File::create(self.dir.join(name))?);
        serde_json::to_writer_pretty(&mut file, value)?;
        file.flush()?;
        self.written.push(name.to_string());
        Ok(())
    }
}

pub fn markdown_table<T>(rows: &[T]) -> String
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(rows.to_vec()).with(Style::markdown()).to_string()
}

pub fn print_table<T>(title: &str, rows: &[T])
where
    T: Tabled + Clone,
{
    println!("{}\n", title);
    println!("{}\n", markdown_table(rows));
}

pub fn profile_rows(view: &AnalysisView) -> Vec<ProfileRow> {
    view.profiles.iter().map(ProfileRow::from).collect()
}

pub fn profile_top_rows(view: &AnalysisView, providers: bool) -> Vec<ProfileTopRow> {
    view.profiles
        .iter()
        .flat_map(|p| {
            let tops = if providers { &p.top_providers } else { &p.top_categories };
            tops.iter().map(move |g| ProfileTopRow {
                rank: p.rank.clone(),
                key: g.key.clone(),
                count: g.count,
            })
        })
        .collect()
}

/// Write every home-view table to `dir`, one CSV per table, plus the summary
/// as JSON. Returns the file names written.
pub fn export_home(dir: &Path, home: &HomeView) -> Result<Vec<String>> {
    let mut out = ExportDir::new(dir);
    out.csv("sexo.csv", &home.sex)?;
    out.csv("elegibilidade.csv", &home.eligibility)?;
    out.csv("faixa_etaria_sexo.csv", &home.age_by_sex)?;
    out.csv("ocorrencias_mes.csv", &home.monthly)?;
    for top in &home.top_by_eligibility {
        let label = top.eligibility.label().to_lowercase();
        out.csv(&format!("top_categorias_{}.csv", label), &top.categories)?;
        out.csv(&format!("top_prestadores_{}.csv", label), &top.providers)?;
    }
    if let SeriesOutcome::Series(buckets) = &home.category_series.outcome {
        out.csv("serie_categoria.csv", buckets)?;
    }
    out.json("summary.json", &home.summary)?;
    info!("exported {} home tables to {}", out.written.len(), dir.display());
    Ok(out.written)
}

pub fn export_analysis(dir: &Path, analysis: &AnalysisView) -> Result<Vec<String>> {
    let mut out = ExportDir::new(dir);
    out.csv("perfis.csv", profile_rows(analysis))?;
    out.csv("perfis_categorias.csv", profile_top_rows(analysis, false))?;
    out.csv("perfis_prestadores.csv", profile_top_rows(analysis, true))?;
    out.json("perfis.json", &analysis.profiles)?;
    info!("exported {} profiles to {}", analysis.profiles.len(), dir.display());
    Ok(out.written)
}

pub fn export_normalized(path: &Path, table: &ClaimTable) -> Result<()> {
    write_rows(path, table.to_raw_rows())
}
