//! ACLED weekly export aggregation.
//!
//! The export carries one row per (week, admin region, event type,
//! sub-event type). Only Israel and Palestine are kept, from the cutoff
//! week on, and summed into three tables:
//!
//! - `fatalities_per_month.csv`: `MONTH,country,fatalities`
//! - `events_per_week.csv`: `WEEK,country,event_type,events`
//! - `events_sankey.csv`: `country,event_type,sub_event_type,events`

use anyhow::Context;
use cdv_core::period::parse_date;
use cdv_core::{Country, YearMonth};
use chrono::NaiveDate;
use log::{info, warn};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

/// One usable row of the export.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyRecord {
    pub week: NaiveDate,
    pub country: Country,
    pub event_type: String,
    pub sub_event_type: String,
    pub events: u64,
    pub fatalities: u64,
}

struct Columns {
    week: usize,
    country: usize,
    event_type: usize,
    sub_event_type: usize,
    events: usize,
    fatalities: usize,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> anyhow::Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .with_context(|| format!("ACLED export has no {} column", name))
        };
        Ok(Self {
            week: find("WEEK")?,
            country: find("COUNTRY")?,
            event_type: find("EVENT_TYPE")?,
            sub_event_type: find("SUB_EVENT_TYPE")?,
            events: find("EVENTS")?,
            fatalities: find("FATALITIES")?,
        })
    }
}

fn count(record: &csv::StringRecord, idx: usize) -> u64 {
    record
        .get(idx)
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v as u64)
        .unwrap_or(0)
}

/// Read the export, keeping the two countries from `cutoff` on.
///
/// Rows of other countries are dropped silently; rows with an unreadable
/// week are skipped with a warning.
pub fn read_export<R: Read>(reader: R, cutoff: NaiveDate) -> anyhow::Result<Vec<WeeklyRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let cols = Columns::locate(rdr.headers()?)?;

    let mut out = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let country = match record.get(cols.country).map(str::trim) {
            Some("Israel") => Country::Israel,
            Some("Palestine") => Country::Palestine,
            _ => continue,
        };
        let raw_week = record.get(cols.week).unwrap_or("");
        let week = match parse_date(raw_week) {
            Ok(d) => d,
            Err(e) => {
                warn!("skipping row: {}", e);
                continue;
            }
        };
        if week < cutoff {
            continue;
        }
        out.push(WeeklyRecord {
            week,
            country,
            event_type: record.get(cols.event_type).unwrap_or("").trim().to_string(),
            sub_event_type: record.get(cols.sub_event_type).unwrap_or("").trim().to_string(),
            events: count(&record, cols.events),
            fatalities: count(&record, cols.fatalities),
        });
    }
    Ok(out)
}

/// Fatalities summed per (month, country).
pub fn fatalities_per_month(records: &[WeeklyRecord]) -> BTreeMap<(YearMonth, Country), u64> {
    let mut out = BTreeMap::new();
    for r in records {
        *out.entry((YearMonth::of(r.week), r.country)).or_insert(0) += r.fatalities;
    }
    out
}

/// Events summed per (week, country, event type).
pub fn events_per_week(records: &[WeeklyRecord]) -> BTreeMap<(NaiveDate, Country, String), u64> {
    let mut out = BTreeMap::new();
    for r in records {
        *out.entry((r.week, r.country, r.event_type.clone())).or_insert(0) += r.events;
    }
    out
}

/// Events summed per (country, event type, sub-event type) over the whole window.
pub fn events_sankey(records: &[WeeklyRecord]) -> BTreeMap<(Country, String, String), u64> {
    let mut out = BTreeMap::new();
    for r in records {
        let key = (r.country, r.event_type.clone(), r.sub_event_type.clone());
        *out.entry(key).or_insert(0) += r.events;
    }
    out
}

pub fn write_fatalities<W: Write>(
    rows: &BTreeMap<(YearMonth, Country), u64>,
    writer: W,
) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["MONTH", "country", "fatalities"])?;
    for ((month, country), fatalities) in rows {
        wtr.write_record([month.to_string(), country.label().to_string(), fatalities.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_weekly<W: Write>(
    rows: &BTreeMap<(NaiveDate, Country, String), u64>,
    writer: W,
) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["WEEK", "country", "event_type", "events"])?;
    for ((week, country, event_type), events) in rows {
        wtr.write_record([
            week.format("%Y-%m-%d").to_string(),
            country.label().to_string(),
            event_type.clone(),
            events.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_sankey<W: Write>(
    rows: &BTreeMap<(Country, String, String), u64>,
    writer: W,
) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["country", "event_type", "sub_event_type", "events"])?;
    for ((country, event_type, sub_event_type), events) in rows {
        wtr.write_record([
            country.label().to_string(),
            event_type.clone(),
            sub_event_type.clone(),
            events.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Run the full ACLED aggregation, writing the three CSVs into `out_dir`.
pub fn run_acled(input: &str, out_dir: &str, cutoff: NaiveDate) -> anyhow::Result<()> {
    let file = std::fs::File::open(input).with_context(|| format!("opening {}", input))?;
    let records = read_export(file, cutoff)?;
    if records.is_empty() {
        anyhow::bail!("no Israel or Palestine rows on or after {} in {}", cutoff, input);
    }

    let first = records.iter().map(|r| r.week).min().unwrap_or(cutoff);
    let last = records.iter().map(|r| r.week).max().unwrap_or(cutoff);
    info!("Data from {} to {} ({} rows)", first, last, records.len());

    let dir = Path::new(out_dir);
    std::fs::create_dir_all(dir)?;

    let monthly = fatalities_per_month(&records);
    write_fatalities(&monthly, std::fs::File::create(dir.join("fatalities_per_month.csv"))?)?;
    info!("fatalities_per_month.csv: {} rows", monthly.len());

    let weekly = events_per_week(&records);
    write_weekly(&weekly, std::fs::File::create(dir.join("events_per_week.csv"))?)?;
    info!("events_per_week.csv: {} rows", weekly.len());

    let sankey = events_sankey(&records);
    write_sankey(&sankey, std::fs::File::create(dir.join("events_sankey.csv"))?)?;
    info!("events_sankey.csv: {} rows", sankey.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "\
WEEK,REGION,COUNTRY,ADMIN1,EVENT_TYPE,SUB_EVENT_TYPE,EVENTS,FATALITIES,POPULATION_EXPOSURE
2022-12-31,Middle East,Palestine,Gaza Strip,Battles,Armed clash,3,1,
2023-01-07,Middle East,Palestine,Gaza Strip,Battles,Armed clash,2,1,
2023-01-07,Middle East,Palestine,West Bank,Battles,Armed clash,4,2,
2023-01-07,Middle East,Israel,HaDarom,Protests,Peaceful protest,5,0,
2023-01-07,Middle East,Lebanon,South,Battles,Armed clash,9,9,
2023-01-14,Middle East,Palestine,West Bank,Riots,Mob violence,1,,
2023-02-04,Middle East,Palestine,Gaza Strip,Explosions/Remote violence,Air/drone strike,6,10,
";

    fn cutoff() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
    }

    fn records() -> Vec<WeeklyRecord> {
        read_export(EXPORT.as_bytes(), cutoff()).unwrap()
    }

    #[test]
    fn keeps_two_countries_from_the_cutoff() {
        let recs = records();
        assert_eq!(recs.len(), 5);
        assert!(recs.iter().all(|r| r.week >= cutoff()));
        // A blank fatality cell counts as zero.
        assert_eq!(recs[3].fatalities, 0);
    }

    #[test]
    fn missing_column_is_an_error() {
        let csv = "WEEK,COUNTRY,EVENTS\n2023-01-07,Israel,1\n";
        assert!(read_export(csv.as_bytes(), cutoff()).is_err());
    }

    #[test]
    fn fatalities_sum_by_month() {
        let monthly = fatalities_per_month(&records());
        let jan = YearMonth::new(2023, 1).unwrap();
        let feb = YearMonth::new(2023, 2).unwrap();
        assert_eq!(monthly[&(jan, Country::Palestine)], 3);
        assert_eq!(monthly[&(jan, Country::Israel)], 0);
        assert_eq!(monthly[&(feb, Country::Palestine)], 10);
    }

    #[test]
    fn weekly_events_merge_regions() {
        let weekly = events_per_week(&records());
        let week = NaiveDate::from_ymd_opt(2023, 1, 7).unwrap();
        assert_eq!(weekly[&(week, Country::Palestine, "Battles".to_string())], 6);
        assert_eq!(weekly.len(), 4);
    }

    #[test]
    fn fatalities_csv_layout() {
        let mut buf = Vec::new();
        write_fatalities(&fatalities_per_month(&records()), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "MONTH,country,fatalities");
        assert_eq!(lines[1], "2023-01,Israel,0");
        assert_eq!(lines[2], "2023-01,Palestine,3");
    }

    #[test]
    fn sankey_csv_keeps_sub_types() {
        let mut buf = Vec::new();
        write_sankey(&events_sankey(&records()), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Palestine,Explosions/Remote violence,Air/drone strike,6"));
        assert!(text.contains("Israel,Protests,Peaceful protest,5"));
    }
}
