//! End-to-end tests through the public crate surface: one HTML document
//! in, ranked race out, stored under an explicit duplicate policy.

use formrank::{
    import_racecard, CardLayout, ClassWeights, DuplicatePolicy, HeaderFallback, ImportError,
    ImportOptions, ImportOutcome, JtRating, RaceStore,
};

const CLASSIC_CARD: &str = r#"<html><body>
    <table>
        <tr><td align="center">VAAL<br>12/09/2025<br>Race 4<br>14.50</td></tr>
        <tr><td>WINTER DASH<br>1400 Metres<br>Class 5</td></tr>
    </table>
    <table border="1">
        <tr>
            <td>5</td><td>ROYAL ECHO</td><td>4yo</td><td>3/1</td>
            <td>{70}</td><td>W Kennedy</td><td>A Nel</td>
        </tr>
        <tr><td colspan="7">
            <table>
                <tr><td>25.06.14</td><td>1</td><td>0.20</td><td>1400m</td><td>Cl5</td></tr>
                <tr><td>25.05.03</td><td>4</td><td>3.00</td><td>1400m</td><td>Cl5</td></tr>
            </table>
        </td></tr>
    </table>
    <table border="1">
        <tr>
            <th>No</th><th>Jockey</th><th>Trainer</th><th>Starts</th>
            <th>1st</th><th>2nd</th><th>3rd</th><th>Win %</th><th>Place %</th>
        </tr>
        <tr>
            <td>5</td><td>W Kennedy</td><td>A Nel</td><td>12</td>
            <td>2</td><td>1</td><td>1</td><td>17</td><td>33</td>
        </tr>
    </table>
</body></html>"#;

// Three first-time starters: every component except merit is level.
const LEVEL_FIELD_CARD: &str = r#"<html><body>
    <table>
        <tr><td align="center">TURFFONTEIN<br>05/09/2025<br>Race 2<br>13.30</td></tr>
        <tr><td>SPRING FEATURE<br>1800 Metres<br>MR 80 Handicap</td></tr>
    </table>
    <table border="1">
        <tr><td>1</td><td>FIRST LIGHT</td><td>3yo</td><td>2/1</td><td>{80}</td><td>G Lerena</td><td>M de Kock</td></tr>
    </table>
    <table border="1">
        <tr><td>2</td><td>SECOND WIND</td><td>3yo</td><td>4/1</td><td>{60}</td><td>C Zackey</td><td>S Tarry</td></tr>
    </table>
    <table border="1">
        <tr><td>3</td><td>THIRD PARTY</td><td>3yo</td><td>8/1</td><td>{40}</td><td>M Yeni</td><td>G Kotzen</td></tr>
    </table>
</body></html>"#;

const STYLED_CARD: &str = r#"<html><body>
    <table>
        <tr><td class="card-header">DURBANVILLE<br>10/10/2025<br>Race 1<br>12.50</td></tr>
        <tr><td class="card-details">SPRING PREVIEW<br>1000 Metres<br>Maiden</td></tr>
    </table>
    <table class="entrant">
        <tr>
            <td>2</td><td>MORNING MIST</td><td>2yo</td><td>6/1</td>
            <td></td><td>R Fourie</td><td>V Marshall</td>
        </tr>
        <tr><td colspan="7">
            <table class="form-lines">
                <tr><th>Date</th><th>Venue</th><th>Pos</th><th>Mgn</th><th>Dist</th><th>Class</th></tr>
                <tr><td>25.09.13</td><td>Kenilworth</td><td>2</td><td>0.50</td><td>1000m</td><td>Maiden</td></tr>
            </table>
        </td></tr>
    </table>
</body></html>"#;

fn import(html: &str) -> formrank::RacecardImport {
    import_racecard(html, &ClassWeights::default(), &ImportOptions::default()).unwrap()
}

#[test]
fn test_classic_card_end_to_end() {
    let result = import(CLASSIC_CARD);

    assert_eq!(result.layout, CardLayout::Classic);
    assert_eq!(result.race.key.course, "VAAL");
    assert_eq!(result.race.key.race_no, 4);
    assert_eq!(result.race.name, "WINTER DASH");
    assert_eq!(result.race.distance_m, 1400);
    assert_eq!(result.race.race_class, "Class 5");

    assert_eq!(result.horses.len(), 1);
    assert_eq!(result.horses[0].horse_no, 5);
    assert_eq!(result.horses[0].runs.len(), 2);

    // 12 starts, 2 wins, 4 top-3: rates come from the counts.
    let stat = &result.jt_stats[&5];
    assert_eq!(stat.starts, 12);
    assert!((stat.score - 44.0).abs() < 0.001);
    assert_eq!(stat.rating, JtRating::Good);

    assert_eq!(result.rankings.len(), 1);
    assert_eq!(result.rankings[0].rank, 1);
    assert_eq!(result.rankings[0].horse_no, 5);
}

#[test]
fn test_merit_orders_an_otherwise_level_field() {
    let result = import(LEVEL_FIELD_CARD);

    assert_eq!(result.horses.len(), 3);
    let order: Vec<u32> = result.rankings.iter().map(|r| r.horse_no).collect();
    assert_eq!(order, vec![1, 2, 3]);
    let ranks: Vec<u32> = result.rankings.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);
    assert!(result.rankings[0].overall > result.rankings[1].overall);
    assert!(result.rankings[1].overall > result.rankings[2].overall);
}

#[test]
fn test_styled_card_skips_venue_column() {
    let result = import(STYLED_CARD);

    assert_eq!(result.layout, CardLayout::Styled);
    assert_eq!(result.race.key.course, "DURBANVILLE");
    assert_eq!(result.race.distance_m, 1000);

    assert_eq!(result.horses.len(), 1);
    let runs = &result.horses[0].runs;
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].position, "2");
    assert_eq!(runs[0].distance, "1000m");
    assert_eq!(runs[0].race_class, "Maiden");
}

#[test]
fn test_store_duplicate_policies() {
    let mut store = RaceStore::new();

    let outcome = store.import(import(CLASSIC_CARD), DuplicatePolicy::Skip).unwrap();
    assert_eq!(outcome, ImportOutcome::Created);

    let outcome = store.import(import(CLASSIC_CARD), DuplicatePolicy::Skip).unwrap();
    assert_eq!(outcome, ImportOutcome::Skipped);

    let outcome = store
        .import(import(CLASSIC_CARD), DuplicatePolicy::Overwrite)
        .unwrap();
    assert_eq!(outcome, ImportOutcome::Updated);

    let err = store
        .import(import(CLASSIC_CARD), DuplicatePolicy::Error)
        .unwrap_err();
    assert!(matches!(err, ImportError::DuplicateRace(_)));

    assert_eq!(store.len(), 1);
    let key = import(CLASSIC_CARD).race.key;
    // Two overwrites later there is still exactly one record per entrant.
    assert_eq!(store.get(&key).unwrap().horses.len(), 1);
}

#[test]
fn test_fallback_identity_recovers_headerless_card() {
    let options = ImportOptions {
        header_fallback: HeaderFallback {
            course: Some("FAIRVIEW".to_string()),
            race_date: chrono::NaiveDate::from_ymd_opt(2025, 9, 12),
            race_no: Some(8),
        },
        ..ImportOptions::default()
    };
    let result = import_racecard(
        "<html><body></body></html>",
        &ClassWeights::default(),
        &options,
    )
    .unwrap();

    assert_eq!(result.race.key.course, "FAIRVIEW");
    assert_eq!(result.race.key.race_no, 8);
    assert!(result.horses.is_empty());
}
