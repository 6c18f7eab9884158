use unidata::config::ProfileConfig;
use unidata::loader::{load_reader, MalformedRows};
use unidata::render::{render, Action, Rendered, Selection, View};
use unidata::series::SeriesOutcome;
use unidata::types::{Eligibility, Month};
use unidata::DashboardError;

const CLAIMS: &str = "\
segurado,categoria,elegibilidade_sinistro,sexo_colaborador_sinistro,faixa_etaria_colaborador_sinistro,nome_prestador_sinistro,valor_pago_sinistro,data_ocorrencia_sinistro,cluster,extra
1,EXAME,titular,M,00 a 18,Instituto Santos,50.00,10/01/2023,8,x
1,exame,Titular,M,00 a 18,Hospital Ribeirao Pires,70.00,22/01/2023,8,x
2,Consulta,dependente,F,34 a 38,A+ Medicina,120.00,05/03/2023,7,x
3,exame,DEPENDENTE,M,59 ou mais,Delboni,300.00,17/03/2023,1,x
3,terapias,titular,M,59 ou mais,Delboni,80.00,01/04/2023,1,x
4,exame,titular,F,39 a 43,Instituto Santos,10.00,30/04/2023,2,x
";

fn load() -> unidata::types::ClaimTable {
    load_reader(CLAIMS.as_bytes(), MalformedRows::Abort).unwrap().0
}

#[test]
fn home_view_end_to_end() {
    let table = load();
    let rendered = render(View::Home, &table, &Selection::default(), &ProfileConfig::default()).unwrap();
    let Rendered::Home(home) = rendered else {
        panic!("expected home view");
    };

    assert_eq!(home.summary.total_claims, 6);
    assert_eq!(home.summary.distinct_claimants, 4);
    assert_eq!(home.summary.claims_per_claimant.as_ref().unwrap(), &1.5);
    assert_eq!(home.summary.max_paid, Some(300.0));
    assert_eq!(home.summary.top_provider.as_deref(), Some("Instituto Santos"));

    let months: Vec<(String, usize)> = home.monthly.iter().map(|b| (b.month.to_string(), b.count)).collect();
    assert_eq!(
        months,
        vec![
            ("2023-01".to_string(), 2),
            ("2023-02".to_string(), 0),
            ("2023-03".to_string(), 2),
            ("2023-04".to_string(), 2),
        ]
    );

    // Categories listed in reverse order of first appearance.
    assert_eq!(home.category_options, vec!["Terapias", "Consulta", "Exame"]);
    let policyholders = &home.top_by_eligibility[0];
    assert_eq!(policyholders.eligibility, Eligibility::Policyholder);
    assert_eq!(policyholders.categories[0].key, "Exame");
    assert_eq!(policyholders.categories[0].count, 3);

    let counted: usize = home.eligibility.iter().map(|g| g.count).sum();
    assert_eq!(counted, 6);
}

#[test]
fn category_series_uses_whole_dataset_window() {
    let table = load();
    let selection = Selection {
        eligibility: Some(vec![Eligibility::Policyholder, Eligibility::Dependent]),
        category: Some("Consulta".to_string()),
    };
    let Rendered::Home(home) = render(View::Home, &table, &selection, &ProfileConfig::default()).unwrap() else {
        panic!("expected home view");
    };
    let buckets = home.category_series.outcome.buckets().unwrap();
    assert_eq!(buckets.len(), 4);
    assert_eq!(buckets[0].month, Month::from_ym(2023, 1).unwrap());
    let counts: Vec<usize> = buckets.iter().map(|b| b.count).collect();
    assert_eq!(counts, vec![0, 0, 1, 0]);

    let none = Selection {
        eligibility: Some(vec![]),
        category: None,
    };
    let Rendered::Home(home) = render(View::Home, &table, &none, &ProfileConfig::default()).unwrap() else {
        panic!("expected home view");
    };
    assert_eq!(home.category_series.outcome, SeriesOutcome::NoSelection);
}

#[test]
fn analysis_view_after_navigation() {
    let table = load();
    let view = View::default().apply(Action::ViewAnalyses);
    let Rendered::Analysis(analysis) = render(view, &table, &Selection::default(), &ProfileConfig::default()).unwrap()
    else {
        panic!("expected analysis view");
    };
    let summary: Vec<(&str, i64, usize, usize)> = analysis
        .profiles
        .iter()
        .map(|p| (p.rank.as_str(), p.cluster_id, p.claims, p.claimants))
        .collect();
    assert_eq!(summary, vec![("1", 8, 2, 1), ("2", 1, 2, 1), ("3", 7, 1, 1)]);
    assert_eq!(analysis.profiles[0].mean_paid, 60.0);
    assert_eq!(analysis.profiles[1].top_providers[0].key, "Delboni");

    let json = serde_json::to_value(Rendered::Analysis(analysis)).unwrap();
    assert_eq!(json["view"], "analysis");
}

#[test]
fn malformed_date_aborts_or_skips() {
    let bad = format!("{}5,exame,titular,M,00 a 18,Lab,1.0,2023/05/01,,x\n", CLAIMS);
    let err = load_reader(bad.as_bytes(), MalformedRows::Abort).unwrap_err();
    assert!(matches!(
        err,
        DashboardError::Parse { row: 6, column: "data_ocorrencia_sinistro", .. }
    ));

    let (table, report) = load_reader(bad.as_bytes(), MalformedRows::Skip).unwrap();
    assert_eq!(table.len(), 6);
    assert_eq!(report.skipped_rows, 1);
}

#[test]
fn ragged_row_is_skipped_in_lenient_mode() {
    let ragged = format!("{}5,exame,titular,M,00 a 18,Lab,1.0,01/05/2023,\n", CLAIMS);
    let err = load_reader(ragged.as_bytes(), MalformedRows::Abort).unwrap_err();
    assert!(matches!(err, DashboardError::Parse { row: 6, .. }));

    let (table, report) = load_reader(ragged.as_bytes(), MalformedRows::Skip).unwrap();
    assert_eq!(table.len(), 6);
    assert_eq!(report.total_rows, 7);
    assert_eq!(report.skipped_rows, 1);
}

#[test]
fn empty_upload_reports_undefined_mean() {
    let header = CLAIMS.lines().next().unwrap();
    let (table, _) = load_reader(header.as_bytes(), MalformedRows::Abort).unwrap();
    let Rendered::Home(home) = render(View::Home, &table, &Selection::default(), &ProfileConfig::default()).unwrap() else {
        panic!("expected home view");
    };
    assert!(matches!(home.summary.claims_per_claimant, Err(DashboardError::DivisionByZero(_))));
    assert!(home.monthly.is_empty());
    assert!(matches!(
        render(View::Analysis, &table, &Selection::default(), &ProfileConfig::default()),
        Err(DashboardError::MissingClusters)
    ));
}
