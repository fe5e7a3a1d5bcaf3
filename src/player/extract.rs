//! Field extraction from player detail pages
//!
//! Pure functions over already-fetched HTML, so the parsing rules can be
//! exercised without a browser. The profile comes from a static attribute
//! table of label/value pairs; season stats come from the table rows the
//! stats tab reveals.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::types::{PlayerRecord, SkipReason};

static NUMBER_RE: OnceLock<Regex> = OnceLock::new();

/// First decimal-or-integer token in a widget's text.
fn first_number(text: &str) -> Option<f32> {
    let re = NUMBER_RE.get_or_init(|| Regex::new(r"[-+]?\d*\.\d+|\d+").unwrap());
    re.find(text).and_then(|m| m.as_str().parse::<f32>().ok())
}

fn text_of(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Build one record from a player's profile page and the page state after
/// the stats tab was revealed. `stats_html` is `None` when the tab was not
/// present on the page.
pub fn build_record(
    profile_html: &str,
    stats_html: Option<&str>,
    season: &str,
) -> Result<PlayerRecord, SkipReason> {
    let doc = Html::parse_document(profile_html);
    let mut record = extract_profile(&doc)?;

    let stats_html = stats_html.ok_or(SkipReason::StatsTabMissing)?;
    let doc = Html::parse_document(stats_html);
    let rows = dedupe_interleaved(collect_season_rows(&doc, season));
    if rows.is_empty() {
        return Err(SkipReason::NoSeasonRows(season.to_string()));
    }
    apply_season_stats(&mut record, &merge_rows(rows), season)?;

    Ok(record)
}

/// Static profile fields: attribute table, trophies, valuations, ratings.
pub fn extract_profile(doc: &Html) -> Result<PlayerRecord, SkipReason> {
    let mut table = attribute_table(doc)?;

    // The xTV range entry sits in the attribute table but is not a record
    // field; a profile without it has an unexpected shape.
    table
        .remove("xTV_Range")
        .ok_or_else(|| SkipReason::MissingField("xTV_Range".to_string()))?;

    let name_sel = Selector::parse("a.text-white").unwrap();
    let name = doc
        .select(&name_sel)
        .next()
        .map(text_of)
        .ok_or_else(|| SkipReason::MissingField("name".to_string()))?;

    let record = PlayerRecord {
        name,
        age: profile_number(&table, "Age")?,
        nationality: table.get("Nationality").cloned().unwrap_or_default(),
        height: profile_number(&table, "Height")?,
        weight: profile_number(&table, "Weight")?,
        team: table.get("Team").cloned().unwrap_or_default(),
        skill: rating(doc, "div.teamInfoTop-skill__skill", "Skill")?,
        potential: rating(doc, "div.teamInfoTop-skill__pot", "Pot")?,
        current_fee: currency(doc, "div.player-value.player-value-large span.player-tag")?,
        highest_xtv: currency(doc, "div.d-row.d-val.d-flex span.player-tag")?,
        trophies: trophy_count(doc),
        preferred_foot: table.get("Preferred_foot").cloned().unwrap_or_default(),
        best_playing_role: table.get("Best_Playing_Role").cloned().unwrap_or_default(),
        ..Default::default()
    };

    Ok(record)
}

/// Label/value pairs of the static attribute table, labels underscored,
/// with the unit-stripping truncations applied to age/height/weight.
fn attribute_table(doc: &Html) -> Result<HashMap<String, String>, SkipReason> {
    let table_sel = Selector::parse("div.row.row-cols-2").unwrap();
    let ttl_sel = Selector::parse("strong.ttl").unwrap();
    let txt_sel = Selector::parse("span.txt").unwrap();

    let table = doc
        .select(&table_sel)
        .next()
        .ok_or_else(|| SkipReason::MissingField("attribute table".to_string()))?;

    let titles = table.select(&ttl_sel).map(|t| text_of(t).replace(' ', "_"));
    let values = table.select(&txt_sel).map(text_of);
    let mut map: HashMap<String, String> = titles.zip(values).collect();

    // "28 years" → "28", "178 cm" → "178", "75 kg" → "75"
    truncate_entry(&mut map, "Age", 2);
    truncate_entry(&mut map, "Height", 3);
    truncate_entry(&mut map, "Weight", 3);

    Ok(map)
}

fn truncate_entry(map: &mut HashMap<String, String>, key: &str, len: usize) {
    if let Some(value) = map.get_mut(key) {
        *value = value.chars().take(len).collect::<String>().trim().to_string();
    }
}

/// A truncated attribute-table value as a number; absent key → 0.
fn profile_number(table: &HashMap<String, String>, key: &'static str) -> Result<u32, SkipReason> {
    match table.get(key) {
        None => Ok(0),
        Some(value) => value.parse::<u32>().map_err(|_| SkipReason::BadNumber {
            field: key,
            value: value.clone(),
        }),
    }
}

/// Number of entries in the trophy panel; a missing panel counts as zero.
fn trophy_count(doc: &Html) -> u32 {
    let sel = Selector::parse("#playerTrophies li").unwrap();
    doc.select(&sel).count() as u32
}

/// Currency-valued field with the "€" symbol stripped.
fn currency(doc: &Html, selector: &'static str) -> Result<String, SkipReason> {
    let sel = Selector::parse(selector).unwrap();
    doc.select(&sel)
        .next()
        .map(|el| text_of(el).replace('€', ""))
        .ok_or_else(|| SkipReason::MissingField(selector.to_string()))
}

/// Skill/potential widget value: absent widget → 0.0, otherwise the first
/// numeric token in its text.
fn rating(doc: &Html, selector: &str, field: &'static str) -> Result<f32, SkipReason> {
    let sel = Selector::parse(selector).unwrap();
    match doc.select(&sel).next() {
        None => Ok(0.0),
        Some(el) => {
            let text = text_of(el);
            first_number(&text).ok_or_else(|| SkipReason::BadNumber {
                field,
                value: text,
            })
        }
    }
}

/// Rows of the stats panel matching `season`, each keyed by the header
/// labels of its enclosing table, in document order.
pub fn collect_season_rows(doc: &Html, season: &str) -> Vec<HashMap<String, String>> {
    let table_sel = Selector::parse("table").unwrap();
    let row_sel = Selector::parse("tr.season-row").unwrap();
    let th_sel = Selector::parse("th").unwrap();
    let td_sel = Selector::parse("td").unwrap();

    let mut rows = Vec::new();
    for table in doc.select(&table_sel) {
        let headers: Vec<String> = table.select(&th_sel).map(text_of).collect();
        if headers.is_empty() {
            continue;
        }
        for row in table.select(&row_sel) {
            let cells: Vec<String> = row.select(&td_sel).map(text_of).collect();
            if cells.first().map(String::as_str) != Some(season) {
                continue;
            }
            let labeled: HashMap<String, String> = headers.iter().cloned().zip(cells).collect();
            rows.push(labeled);
        }
    }
    debug!(count = rows.len(), season, "collected season rows");
    rows
}

/// The source interleaves a duplicate before every real row; keep the
/// odd-indexed half.
pub fn dedupe_interleaved<T>(rows: Vec<T>) -> Vec<T> {
    rows.into_iter()
        .enumerate()
        .filter(|(i, _)| i % 2 == 1)
        .map(|(_, row)| row)
        .collect()
}

fn merge_rows(rows: Vec<HashMap<String, String>>) -> HashMap<String, String> {
    let mut merged = HashMap::new();
    for row in rows {
        merged.extend(row);
    }
    merged
}

/// Fill the season-stat fields from the merged label→cell map.
pub fn apply_season_stats(
    record: &mut PlayerRecord,
    stats: &HashMap<String, String>,
    season: &str,
) -> Result<(), SkipReason> {
    record.season = season.to_string();
    record.matches_played = stat_u32(stats, "Matches played")?;
    record.minutes_played = stat_f32(stats, "Minutes played")?;
    record.goals = stat_u32(stats, "Goals")?;
    record.assists = stat_u32(stats, "Assists")?;
    record.yellow_cards = stat_u32(stats, "Yellow cards")?;
    record.red_cards = stat_u32(stats, "Red cards")?;
    record.shots = stat_f32(stats, "Shots")?;
    record.penalties = stat_u32(stats, "Penalties")?;
    record.expected_goals = stat_u32(stats, "Expected goals")?;
    record.attacking_challenges = stat_u32(stats, "Attacking challenges")?;
    record.passes = stat_f32(stats, "Passes")?;
    record.key_passes = stat_u32(stats, "Key passes")?;
    record.crosses = stat_u32(stats, "Crosses")?;
    record.offsides = stat_u32(stats, "Offsides")?;
    record.ball_recoveries = stat_u32(stats, "Ball recoveries")?;
    record.ball_recoveries_opponent_half = stat_u32(stats, "Ball recoveries in opponent's half")?;
    record.challenges = stat_u32(stats, "Challenges")?;
    record.air_challenges = stat_u32(stats, "Air challenges")?;
    record.tackles = stat_u32(stats, "Tackles")?;
    record.ball_interceptions = stat_u32(stats, "Ball interceptions")?;
    record.lost_balls = stat_u32(stats, "Lost balls")?;
    record.lost_balls_own_half = stat_u32(stats, "Lost balls in own half")?;
    record.errors_leading_to_goal = stat_u32(stats, "Errors leading to goal")?;
    Ok(())
}

/// Stat cell as an integer; absent column or dash placeholder → 0.
fn stat_u32(stats: &HashMap<String, String>, label: &'static str) -> Result<u32, SkipReason> {
    match stats.get(label).map(String::as_str) {
        None | Some("-") => Ok(0),
        Some(value) => value
            .trim()
            .parse::<u32>()
            .map_err(|_| SkipReason::BadNumber {
                field: label,
                value: value.to_string(),
            }),
    }
}

/// Stat cell as a float; absent column or dash placeholder → 0.0.
fn stat_f32(stats: &HashMap<String, String>, label: &'static str) -> Result<f32, SkipReason> {
    match stats.get(label).map(String::as_str) {
        None | Some("-") => Ok(0.0),
        Some(value) => value
            .trim()
            .parse::<f32>()
            .map_err(|_| SkipReason::BadNumber {
                field: label,
                value: value.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_html(trophies: bool, ratings: bool) -> String {
        let trophies_block = if trophies {
            r#"<div id="playerTrophies"><ul>
                 <li>Ligue 1</li><li>World Cup</li><li>Coupe de France</li>
               </ul></div>"#
        } else {
            ""
        };
        let ratings_block = if ratings {
            r#"<div class="teamInfoTop-skill__skill">88.6 Skill</div>
               <div class="teamInfoTop-skill__pot">94.1 Potential</div>"#
        } else {
            ""
        };
        format!(
            r#"<html><body>
              <a class="text-white" href="/player/123"> K. Mbappe </a>
              {ratings_block}
              <div class="d-row d-val d-flex"><span class="player-tag">€180.5m</span></div>
              <div class="player-value player-value-large"><span class="player-tag">€160m</span></div>
              <div class="row row-cols-2">
                <strong class="ttl">Age</strong><span class="txt">25 years</span>
                <strong class="ttl">Nationality</strong><span class="txt">France</span>
                <strong class="ttl">Height</strong><span class="txt">178 cm</span>
                <strong class="ttl">Weight</strong><span class="txt">75 kg</span>
                <strong class="ttl">Team</strong><span class="txt">Real Madrid</span>
                <strong class="ttl">Preferred foot</strong><span class="txt">Right</span>
                <strong class="ttl">Best Playing Role</strong><span class="txt">Striker</span>
                <strong class="ttl">xTV Range</strong><span class="txt">€150m - €190m</span>
              </div>
              {trophies_block}
            </body></html>"#
        )
    }

    fn stats_table(headers: &[&str], rows: &[&[&str]]) -> String {
        let head: String = headers.iter().map(|h| format!("<th>{h}</th>")).collect();
        let body: String = rows
            .iter()
            .map(|row| {
                let cells: String = row.iter().map(|c| format!("<td>{c}</td>")).collect();
                format!(r#"<tr class="season-row">{cells}</tr>"#)
            })
            .collect();
        format!("<table><thead><tr>{head}</tr></thead><tbody>{body}</tbody></table>")
    }

    fn stats_html(season: &str) -> String {
        // Each group carries a duplicate row before the real one, plus a
        // row from an older season that must be filtered out.
        let summary = stats_table(
            &[
                "Season", "Matches played", "Minutes played", "Goals", "Assists",
                "Yellow cards", "Red cards",
            ],
            &[
                &["2021/2022", "29", "2455", "21", "5", "4", "1"],
                &[season, "-", "-", "-", "-", "-", "-"],
                &[season, "34", "2890", "28", "7", "3", "-"],
            ],
        );
        let attack = stats_table(
            &["Season", "Shots", "Penalties", "Expected goals", "Attacking challenges"],
            &[
                &[season, "-", "-", "-", "-"],
                &[season, "98", "6", "-", "54"],
            ],
        );
        let passing = stats_table(
            &["Season", "Passes", "Key passes", "Crosses"],
            &[
                &[season, "-", "-", "-"],
                &[season, "1030.5", "38", "112"],
            ],
        );
        let defence = stats_table(
            &[
                "Season", "Offsides", "Ball recoveries",
                "Ball recoveries in opponent's half", "Challenges", "Air challenges",
                "Tackles", "Ball interceptions",
            ],
            &[
                &[season, "-", "-", "-", "-", "-", "-", "-"],
                &[season, "14", "87", "33", "140", "45", "27", "19"],
            ],
        );
        let errors = stats_table(
            &["Season", "Lost balls", "Lost balls in own half", "Errors leading to goal"],
            &[
                &[season, "-", "-", "-"],
                &[season, "210", "40", "1"],
            ],
        );
        format!("<html><body>{summary}{attack}{passing}{defence}{errors}</body></html>")
    }

    #[test]
    fn test_truncation_strips_units() {
        let doc = Html::parse_document(&profile_html(true, true));
        let record = extract_profile(&doc).unwrap();
        assert_eq!(record.age, 25);
        assert_eq!(record.height, 178);
        assert_eq!(record.weight, 75);
    }

    #[test]
    fn test_currency_symbol_stripped() {
        let doc = Html::parse_document(&profile_html(true, true));
        let record = extract_profile(&doc).unwrap();
        assert_eq!(record.current_fee, "160m");
        assert_eq!(record.highest_xtv, "180.5m");
    }

    #[test]
    fn test_trophy_count() {
        let doc = Html::parse_document(&profile_html(true, true));
        assert_eq!(extract_profile(&doc).unwrap().trophies, 3);

        let doc = Html::parse_document(&profile_html(false, true));
        assert_eq!(extract_profile(&doc).unwrap().trophies, 0);
    }

    #[test]
    fn test_ratings_parsed() {
        let doc = Html::parse_document(&profile_html(true, true));
        let record = extract_profile(&doc).unwrap();
        assert_eq!(record.skill, 88.6);
        assert_eq!(record.potential, 94.1);
    }

    #[test]
    fn test_missing_rating_widgets_default_to_zero() {
        let doc = Html::parse_document(&profile_html(true, false));
        let record = extract_profile(&doc).unwrap();
        assert_eq!(record.skill, 0.0);
        assert_eq!(record.potential, 0.0);
    }

    #[test]
    fn test_first_number_token() {
        assert_eq!(first_number("82.4 Overall"), Some(82.4));
        assert_eq!(first_number("Rating: 91"), Some(91.0));
        assert_eq!(first_number("n/a"), None);
    }

    #[test]
    fn test_profile_name_and_table_fields() {
        let doc = Html::parse_document(&profile_html(true, true));
        let record = extract_profile(&doc).unwrap();
        assert_eq!(record.name, "K. Mbappe");
        assert_eq!(record.nationality, "France");
        assert_eq!(record.team, "Real Madrid");
        assert_eq!(record.preferred_foot, "Right");
        assert_eq!(record.best_playing_role, "Striker");
    }

    #[test]
    fn test_missing_xtv_range_is_a_skip() {
        let html = profile_html(true, true).replace("xTV Range", "Some Label");
        let doc = Html::parse_document(&html);
        match extract_profile(&doc) {
            Err(SkipReason::MissingField(field)) => assert_eq!(field, "xTV_Range"),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_attribute_table_is_a_skip() {
        let doc = Html::parse_document("<html><body><p>nothing here</p></body></html>");
        assert!(matches!(
            extract_profile(&doc),
            Err(SkipReason::MissingField(_))
        ));
    }

    #[test]
    fn test_dedupe_keeps_odd_indices() {
        let rows: Vec<u32> = (0..10).collect();
        assert_eq!(dedupe_interleaved(rows), vec![1, 3, 5, 7, 9]);
    }

    #[test]
    fn test_season_filter_and_labeling() {
        let doc = Html::parse_document(&stats_html("2022/2023"));
        let rows = collect_season_rows(&doc, "2022/2023");
        // 2 matching rows per group, the 2021/2022 row dropped
        assert_eq!(rows.len(), 10);
        let kept = dedupe_interleaved(rows);
        assert_eq!(kept.len(), 5);
        assert_eq!(kept[0].get("Goals").map(String::as_str), Some("28"));
    }

    #[test]
    fn test_dash_coerces_to_zero() {
        let mut stats = HashMap::new();
        stats.insert("Goals".to_string(), "-".to_string());
        stats.insert("Minutes played".to_string(), "-".to_string());
        assert_eq!(stat_u32(&stats, "Goals").unwrap(), 0);
        assert_eq!(stat_f32(&stats, "Minutes played").unwrap(), 0.0);
    }

    #[test]
    fn test_garbage_stat_is_a_skip() {
        let mut stats = HashMap::new();
        stats.insert("Goals".to_string(), "abc".to_string());
        assert!(matches!(
            stat_u32(&stats, "Goals"),
            Err(SkipReason::BadNumber { field: "Goals", .. })
        ));
    }

    #[test]
    fn test_absent_stat_column_defaults() {
        let stats = HashMap::new();
        assert_eq!(stat_u32(&stats, "Tackles").unwrap(), 0);
        assert_eq!(stat_f32(&stats, "Passes").unwrap(), 0.0);
    }

    #[test]
    fn test_build_record_full() {
        let record = build_record(
            &profile_html(true, true),
            Some(&stats_html("2022/2023")),
            "2022/2023",
        )
        .unwrap();

        assert_eq!(record.season, "2022/2023");
        assert_eq!(record.matches_played, 34);
        assert_eq!(record.minutes_played, 2890.0);
        assert_eq!(record.goals, 28);
        assert_eq!(record.assists, 7);
        assert_eq!(record.yellow_cards, 3);
        assert_eq!(record.red_cards, 0); // dash in the source
        assert_eq!(record.shots, 98.0);
        assert_eq!(record.penalties, 6);
        assert_eq!(record.expected_goals, 0); // dash in the source
        assert_eq!(record.attacking_challenges, 54);
        assert_eq!(record.passes, 1030.5);
        assert_eq!(record.key_passes, 38);
        assert_eq!(record.crosses, 112);
        assert_eq!(record.offsides, 14);
        assert_eq!(record.ball_recoveries, 87);
        assert_eq!(record.ball_recoveries_opponent_half, 33);
        assert_eq!(record.challenges, 140);
        assert_eq!(record.air_challenges, 45);
        assert_eq!(record.tackles, 27);
        assert_eq!(record.ball_interceptions, 19);
        assert_eq!(record.lost_balls, 210);
        assert_eq!(record.lost_balls_own_half, 40);
        assert_eq!(record.errors_leading_to_goal, 1);
    }

    #[test]
    fn test_build_record_without_stats_tab() {
        let result = build_record(&profile_html(true, true), None, "2022/2023");
        assert!(matches!(result, Err(SkipReason::StatsTabMissing)));
    }

    #[test]
    fn test_build_record_wrong_season() {
        let result = build_record(
            &profile_html(true, true),
            Some(&stats_html("2022/2023")),
            "2019/2020",
        );
        assert!(matches!(result, Err(SkipReason::NoSeasonRows(_))));
    }
}
