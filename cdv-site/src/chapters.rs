//! The story: an introduction and six chapters, each wrapping its widgets.

use cdv_chart_ui::charts::{
    EventSankey, EventsRidge, FatalitiesDonut, FatalitiesLineChart, IncidentMap, IndicatorMultiples,
    MortalityViolin, TerritoryMap,
};
use cdv_chart_ui::components::CountryLegend;
use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
struct SectionProps {
    id: String,
    title: String,
    children: Element,
}

#[component]
fn Section(props: SectionProps) -> Element {
    rsx! {
        section {
            id: "{props.id}",
            class: "chapter",
            h2 { class: "chapter-title", "{props.title}" }
            {props.children}
        }
    }
}

#[component]
pub fn Chapters() -> Element {
    rsx! {
        Section {
            id: "introduction",
            title: "War or Genocide?",
            p {
                "Since October 2023 the conflict between Israel and Palestine has produced some of the "
                "most intensely documented violence of recent decades. This story follows the numbers: "
                "how people lived before, how and at what age they died, what kinds of events shaped the "
                "war, and where infrastructure was hit."
            }
            CountryLegend {}
            TerritoryMap {}
        }
        Section {
            id: "chapter1",
            title: "Life",
            p {
                "Four indicators describe living conditions on both sides: income, access to safe water "
                "and sanitation, and food insecurity. Click a panel to bring it to the front."
            }
            IndicatorMultiples {}
        }
        Section {
            id: "chapter2",
            title: "Mortality",
            p {
                "The age at which people die says a lot about how they die. Each violin shows the "
                "distribution of deaths by age for one year; play the timeline to see it shift."
            }
            MortalityViolin {}
        }
        Section {
            id: "chapter3",
            title: "Events",
            p {
                "Every recorded event belongs to a type and a sub-type. The flows show how each "
                "country's events split between them."
            }
            EventSankey {}
        }
        Section {
            id: "chapter4",
            title: "Timeline",
            p {
                "Weekly event counts from 2023 onward, one ridge per country over a shared baseline. "
                "Filter the event types to compare them."
            }
            EventsRidge {}
        }
        Section {
            id: "chapter5",
            title: "Fatalities",
            p {
                "Monthly reported fatalities, and the share of the total each side has carried."
            }
            FatalitiesLineChart {}
            FatalitiesDonut {}
        }
        Section {
            id: "chapter6",
            title: "Map",
            p {
                "Attacks on food systems and health care, and clusters of damaged buildings, across "
                "the Gaza Strip. Step through the months to follow how they spread."
            }
            IncidentMap {}
        }
    }
}
