use std::env;
use std::fs;
use std::path::Path;

/// Fixtures embedded with `include_str!`, with the header written when the
/// file is missing so the site still builds (and shows empty charts).
const FIXTURES: [(&str, &str); 9] = [
    ("fatalities_per_month.csv", "MONTH,country,fatalities\n"),
    ("events_per_week.csv", "WEEK,country,event_type,events\n"),
    ("events_sankey.csv", "country,event_type,sub_event_type,events\n"),
    ("mortality.csv", "Country,Year\n"),
    (
        "Combined_SmallMultiple.csv",
        "Country,Year,GDP_per_capita,Drinking_Water_Access_Percent,Sanitation_Access_Percent,Food_Insecurity_Percent\n",
    ),
    (
        "Combined_Incidents_GeoChart.csv",
        "id,date,latitude,longitude,type,perpetrator,weapon,description\n",
    ),
    ("gaza_boundaries.geojson", ""),
    ("damage_clusters.geojson", ""),
    ("unified_territories.geojson", ""),
];

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();

    for (name, placeholder) in FIXTURES {
        let src = Path::new("../fixtures").join(name);
        let dest = Path::new(&out_dir).join(name);
        if src.exists() {
            fs::copy(&src, &dest).unwrap();
        } else {
            println!("cargo:warning=fixtures/{} not found, embedding an empty placeholder", name);
            fs::write(&dest, placeholder).unwrap();
        }
        println!("cargo:rerun-if-changed=../fixtures/{}", name);
    }

    println!("cargo:rerun-if-changed=build.rs");
}
