use anyhow::Result;
use blowdown_advisor::config::file::FileConfig;
use blowdown_advisor::core::recommend::{recommend, release_bounds};
use blowdown_advisor::utils::validation::Validate;
use blowdown_advisor::{CliConfig, LoadEngine, LocalStorage, SpreadsheetPipeline};
use clap::Parser;
use tempfile::TempDir;

const SAMPLE_CSV: &str = "\
Blowdown Gas Volumes,,,
Volume Type,Valve Size [in],Duration [s],Release [MCF]
Tank,2,10,5
Tank,3,15,8
Pipeline,4,30,20
Tank,not-a-number,1,1
,2,3,4
";

async fn load_table(dir: &TempDir, file_name: &str, args: &[&str]) -> Result<blowdown_advisor::MeasurementTable> {
    let mut argv = vec!["blowdown-advisor", "--input-path", file_name];
    argv.extend_from_slice(args);

    let config = CliConfig::parse_from(argv);
    config.validate()?;

    let storage = LocalStorage::new(dir.path());
    let pipeline = SpreadsheetPipeline::new(storage, config);
    let engine = LoadEngine::new(pipeline);
    Ok(engine.run().await?)
}

#[tokio::test]
async fn csv_load_and_recommend_end_to_end() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(temp_dir.path().join("blowdown.csv"), SAMPLE_CSV)?;

    let table = load_table(&temp_dir, "blowdown.csv", &[]).await?;

    println!("📊 Loaded {} measurements", table.len());
    assert_eq!(table.len(), 3, "malformed rows must be dropped at load");
    assert_eq!(table.volume_types(), vec!["Tank", "Pipeline"]);

    let subset = table.filter_by_type("Tank");
    let bounds = release_bounds(&subset).unwrap();
    assert_eq!(bounds.min, 5.0);
    assert_eq!(bounds.max, 8.0);

    // target equal to the subset minimum
    let rec = recommend(&subset, 5.0).unwrap();
    assert_eq!(
        (rec.valve_size_in, rec.duration_s, rec.release_mcf),
        (2.0, 10.0, 5.0)
    );

    // target between the two releases skips the undersized valve
    let rec = recommend(&subset, 6.0).unwrap();
    assert_eq!(
        (rec.valve_size_in, rec.duration_s, rec.release_mcf),
        (3.0, 15.0, 8.0)
    );

    // target above every release
    assert!(recommend(&subset, 9.0).is_none());

    println!("✅ Recommendation scenarios hold");
    Ok(())
}

#[tokio::test]
async fn loaded_records_are_finite_and_in_domain() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let csv = "\
title,,,
Volume Type,Valve Size [in],Duration [s],Release [MCF]
Tank,2,10,5
Tank,inf,10,5
Tank,3,NaN,8
Well,1.5,20,0
";
    std::fs::write(temp_dir.path().join("blowdown.csv"), csv)?;

    let table = load_table(&temp_dir, "blowdown.csv", &[]).await?;

    assert_eq!(table.len(), 2);
    for m in table.records() {
        assert!(m.valve_size_in.is_finite() && m.valve_size_in > 0.0);
        assert!(m.duration_s.is_finite() && m.duration_s > 0.0);
        assert!(m.release_mcf.is_finite() && m.release_mcf >= 0.0);
    }
    Ok(())
}

#[tokio::test]
async fn single_release_value_collapses_the_range() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let csv = "\
title,,,
Volume Type,Valve Size [in],Duration [s],Release [MCF]
Flare,1,5,3
Flare,2,9,3
";
    std::fs::write(temp_dir.path().join("blowdown.csv"), csv)?;

    let table = load_table(&temp_dir, "blowdown.csv", &[]).await?;
    let subset = table.filter_by_type("Flare");
    let bounds = release_bounds(&subset).unwrap();

    assert!(bounds.is_fixed());
    assert_eq!(bounds.min, 3.0);

    // with the target pinned to the fixed value the smaller valve wins
    let rec = recommend(&subset, bounds.min).unwrap();
    assert_eq!(rec.valve_size_in, 1.0);
    Ok(())
}

#[tokio::test]
async fn toml_config_remaps_columns() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let csv = "\
ignored title,,,
Type,Size [in],Time [s],Released [MCF]
Tank,2,10,5
Tank,3,15,8
";
    std::fs::write(temp_dir.path().join("remapped.csv"), csv)?;

    let config_path = temp_dir.path().join("advisor.toml");
    std::fs::write(
        &config_path,
        r#"
[columns]
volume_type = "Type"
valve_size = "Size [in]"
duration = "Time [s]"
release = "Released [MCF]"
"#,
    )?;

    let mut config = CliConfig::parse_from(["blowdown-advisor", "--input-path", "remapped.csv"]);
    config.apply_file(FileConfig::from_file(config_path.to_str().unwrap())?);
    config.validate()?;

    let storage = LocalStorage::new(temp_dir.path());
    let engine = LoadEngine::new(SpreadsheetPipeline::new(storage, config));
    let table = engine.run().await?;

    println!("🔧 Remapped columns loaded {} measurements", table.len());
    assert_eq!(table.len(), 2);
    let subset = table.filter_by_type("Tank");
    assert_eq!(recommend(&subset, 6.0).unwrap().valve_size_in, 3.0);
    Ok(())
}

#[tokio::test]
async fn empty_category_has_no_bounds() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(temp_dir.path().join("blowdown.csv"), SAMPLE_CSV)?;

    let table = load_table(&temp_dir, "blowdown.csv", &[]).await?;
    let subset = table.filter_by_type("Separator");
    assert!(subset.is_empty());
    assert!(release_bounds(&subset).is_none());
    Ok(())
}
