//! World Bank indicator tables.
//!
//! Each download is a wide table: one row per area (`REF_AREA_LABEL`) and
//! one column per year. The two countries' rows are melted into
//! `(country, year, value)` triples and the four indicators outer-joined
//! into `Combined_SmallMultiple.csv`.

use anyhow::Context;
use cdv_core::{Country, Indicator};
use log::info;
use std::collections::BTreeMap;
use std::io::{Read, Write};

pub const DEFAULT_START_YEAR: i32 = 2018;

/// Paths of the four downloads.
pub struct IndicatorTables<'a> {
    pub gdp: &'a str,
    pub water: &'a str,
    pub sanitation: &'a str,
    pub food_insecurity: &'a str,
}

/// One melted observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub country: Country,
    pub year: i32,
    pub value: f64,
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn area_country(label: &str) -> Option<Country> {
    match label.trim() {
        "Israel" => Some(Country::Israel),
        "Palestine" | "State of Palestine" | "West Bank and Gaza" => Some(Country::Palestine),
        _ => None,
    }
}

/// Melt one wide table.
///
/// Food insecurity tables also carry confidence-interval rows and sex
/// breakdowns; only percentage (`UNIT_MEASURE = PT`) totals (`SEX = _T`)
/// are kept when those columns exist.
pub fn melt<R: Read>(reader: R, indicator: Indicator, start_year: i32) -> anyhow::Result<Vec<Observation>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h.trim() == name);

    let area = position("REF_AREA_LABEL").context("table has no REF_AREA_LABEL column")?;
    let (unit, sex) = if indicator == Indicator::FoodInsecurity {
        (position("UNIT_MEASURE"), position("SEX"))
    } else {
        (None, None)
    };
    let years: Vec<(usize, i32)> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| {
            let h = h.trim();
            (h.len() == 4).then(|| h.parse::<i32>().ok()).flatten().map(|y| (i, y))
        })
        .filter(|(_, y)| *y >= start_year)
        .collect();

    let mut out = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let Some(country) = record.get(area).and_then(area_country) else {
            continue;
        };
        if unit.is_some_and(|i| record.get(i).map(str::trim) != Some("PT")) {
            continue;
        }
        if sex.is_some_and(|i| record.get(i).map(str::trim) != Some("_T")) {
            continue;
        }
        for &(idx, year) in &years {
            let Some(value) = record
                .get(idx)
                .and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
            else {
                continue;
            };
            let value = if indicator.is_percentage() { round1(value) } else { value };
            out.push(Observation { country, year, value });
        }
    }
    Ok(out)
}

/// Combined rows keyed by (country, year), one optional value per indicator
/// in [`Indicator::ALL`] order.
pub type Combined = BTreeMap<(Country, i32), [Option<f64>; 4]>;

/// Outer join of the melted tables. A later observation for the same key
/// replaces an earlier one.
pub fn combine(tables: &[(Indicator, Vec<Observation>)]) -> Combined {
    let mut out = Combined::new();
    for (indicator, observations) in tables {
        let Some(slot) = Indicator::ALL.iter().position(|i| i == indicator) else {
            continue;
        };
        for obs in observations {
            out.entry((obs.country, obs.year)).or_insert([None; 4])[slot] = Some(obs.value);
        }
    }
    out
}

pub fn write_combined<W: Write>(combined: &Combined, writer: W) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec!["Country", "Year"];
    header.extend(Indicator::ALL.iter().map(Indicator::column));
    wtr.write_record(&header)?;

    for ((country, year), values) in combined {
        let mut row = vec![country.label().to_string(), year.to_string()];
        row.extend(values.iter().map(|v| v.map(|v| v.to_string()).unwrap_or_default()));
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn run_indicators(tables: &IndicatorTables, output: &str, start_year: i32) -> anyhow::Result<()> {
    let sources = [
        (Indicator::GdpPerCapita, tables.gdp),
        (Indicator::DrinkingWater, tables.water),
        (Indicator::Sanitation, tables.sanitation),
        (Indicator::FoodInsecurity, tables.food_insecurity),
    ];

    let mut melted = Vec::with_capacity(sources.len());
    for (indicator, path) in sources {
        let file = std::fs::File::open(path).with_context(|| format!("opening {}", path))?;
        let observations = melt(file, indicator, start_year)?;
        info!("{} processed: {} rows", indicator.column(), observations.len());
        melted.push((indicator, observations));
    }

    let combined = combine(&melted);
    if let Some(parent) = std::path::Path::new(output).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    write_combined(&combined, std::fs::File::create(output)?)?;

    let first = combined.keys().map(|(_, y)| *y).min();
    let last = combined.keys().map(|(_, y)| *y).max();
    if let (Some(first), Some(last)) = (first, last) {
        info!("Combined dataset: {} rows, {} - {}", combined.len(), first, last);
    }
    Ok(())
}
