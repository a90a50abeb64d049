use serde_json::{Map, Value};
use tracing::warn;

use crate::models::event::OddsLine;
use crate::utils::json::{collection_items, field, lenient_string};

const NOT_AVAILABLE: &str = "N/A";

/// Flattens an odds response into one line per market outcome, priced by
/// `bookmaker`. `markets` and each market's `outcomes` may be arrays or
/// id-keyed objects; anything else yields no lines.
pub fn process_odds(response: &Value, bookmaker: &str, event_id: &str) -> Vec<OddsLine> {
    let Some(markets_payload) = response.as_object().and_then(|r| field(r, "markets")) else {
        return Vec::new();
    };

    let Some(markets) = collection_items(markets_payload) else {
        warn!(event_id, "unexpected 'markets' payload shape, skipping");
        return Vec::new();
    };

    let mut lines = Vec::new();
    for market in markets {
        let Some(market) = market.as_object() else {
            warn!(event_id, "market entry is not an object, skipping: {market}");
            continue;
        };
        lines.extend(process_market(market, bookmaker, event_id));
    }
    lines
}

fn process_market(market: &Map<String, Value>, bookmaker: &str, event_id: &str) -> Vec<OddsLine> {
    let market_name = text_or_default(market, "marketName", NOT_AVAILABLE);
    let short = text_or_default(market, "marketNameShort", &market_name);
    let handicap = field(market, "handicap").cloned();
    let odds_type = text_or_default(market, "oddsType", NOT_AVAILABLE);

    let Some(outcomes_payload) = field(market, "outcomes") else {
        return Vec::new();
    };

    let Some(outcomes) = collection_items(outcomes_payload) else {
        warn!(event_id, market = %market_name, "unexpected 'outcomes' payload shape, skipping");
        return Vec::new();
    };

    outcomes
        .into_iter()
        .filter_map(|outcome| {
            let Some(outcome) = outcome.as_object() else {
                warn!(event_id, "outcome entry is not an object, skipping: {outcome}");
                return None;
            };

            let odds = outcome
                .get("bookmakers")
                .and_then(|books| books.get(bookmaker))
                .and_then(|book| book.get("price"))
                .filter(|price| !price.is_null())
                .cloned();

            Some(OddsLine {
                market: market_name.clone(),
                short: short.clone(),
                handicap: handicap.clone(),
                odds_type: odds_type.clone(),
                outcome: text_or_default(outcome, "outcomeName", NOT_AVAILABLE),
                odds,
            })
        })
        .collect()
}

fn text_or_default(object: &Map<String, Value>, key: &str, default: &str) -> String {
    object.get(key).and_then(lenient_string).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flattens_keyed_markets_and_outcomes() {
        let response = json!({
            "markets": {
                "101": {
                    "marketName": "Match Winner",
                    "marketNameShort": "1x2",
                    "oddsType": "prematch",
                    "outcomes": {
                        "1": {"outcomeName": "Sinner", "bookmakers": {"bet365": {"price": 1.44}}},
                        "2": {"outcomeName": "Alcaraz", "bookmakers": {"pinnacle": {"price": 2.9}}}
                    }
                }
            }
        });

        let lines = process_odds(&response, "bet365", "e1");

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].market, "Match Winner");
        assert_eq!(lines[0].short, "1x2");
        assert_eq!(lines[0].outcome, "Sinner");
        assert_eq!(lines[0].odds, Some(json!(1.44)));
        assert_eq!(lines[1].outcome, "Alcaraz");
        assert_eq!(lines[1].odds, None);
    }

    #[test]
    fn test_defaults_and_handicap() {
        let response = json!({
            "markets": [
                {"handicap": -1.5, "outcomes": [{"bookmakers": {"bet365": {"price": "1.90"}}}]},
                "garbage",
                {"marketName": "No outcomes"}
            ]
        });

        let lines = process_odds(&response, "bet365", "e2");

        assert_eq!(
            lines,
            vec![OddsLine {
                market: "N/A".into(),
                short: "N/A".into(),
                handicap: Some(json!(-1.5)),
                odds_type: "N/A".into(),
                outcome: "N/A".into(),
                odds: Some(json!("1.90")),
            }]
        );
    }

    #[test]
    fn test_short_name_falls_back_to_market_name() {
        let response = json!({"markets": [{"marketName": "Total Games", "outcomes": [{"outcomeName": "Over"}]}]});
        let lines = process_odds(&response, "bet365", "e3");
        assert_eq!(lines[0].short, "Total Games");
    }

    #[test]
    fn test_unusable_payloads_yield_nothing() {
        assert!(process_odds(&json!(null), "bet365", "e").is_empty());
        assert!(process_odds(&json!({"message": "no odds"}), "bet365", "e").is_empty());
        assert!(process_odds(&json!({"markets": "closed"}), "bet365", "e").is_empty());
        assert!(process_odds(&json!([{"markets": []}]), "bet365", "e").is_empty());
    }
}
