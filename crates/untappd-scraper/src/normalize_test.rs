use super::*;

// -----------------------------------------------------------------------
// field parsers
// -----------------------------------------------------------------------

#[test]
fn abv_strips_percent_and_unit() {
    assert_eq!(parse_abv("5.6% ABV"), Some(5.6));
    assert_eq!(parse_abv("12% ABV"), Some(12.0));
}

#[test]
fn abv_not_available_is_none() {
    assert_eq!(parse_abv("N/A ABV"), None);
    assert_eq!(parse_abv(""), None);
}

#[test]
fn ibu_reads_leading_number() {
    assert_eq!(parse_ibu("35 IBU"), Some(35.0));
    assert_eq!(parse_ibu("N/A IBU"), None);
}

#[test]
fn rating_strips_parentheses() {
    assert_eq!(parse_rating("(3.87)"), Some(3.87));
    assert_eq!(parse_rating(" (4) "), Some(4.0));
    assert_eq!(parse_rating("(N/A)"), None);
}

#[test]
fn raters_drops_thousands_separators() {
    assert_eq!(parse_raters("1,234 Ratings"), Some(1234));
    assert_eq!(parse_raters("1,234,567 Ratings"), Some(1_234_567));
    assert_eq!(parse_raters("7 Ratings"), Some(7));
    assert_eq!(parse_raters("No Ratings"), None);
}

#[test]
fn added_date_is_month_day_short_year() {
    assert_eq!(
        parse_added_date("Added 03/14/15"),
        NaiveDate::from_ymd_opt(2015, 3, 14)
    );
}

#[test]
fn added_date_rejects_other_shapes() {
    assert_eq!(parse_added_date("Added"), None);
    assert_eq!(parse_added_date("Added 2015-03-14"), None);
    assert_eq!(parse_added_date("Added 14/03/15"), None);
}

// -----------------------------------------------------------------------
// normalize_beer
// -----------------------------------------------------------------------

fn raw_beer() -> BeerRecord {
    BeerRecord {
        id: "4473".to_owned(),
        name: "Two Hearted Ale".to_owned(),
        brewery: "Bell's Brewery".to_owned(),
        style: "IPA - American".to_owned(),
        abv: "7% ABV".to_owned(),
        ibu: "55 IBU".to_owned(),
        rating: "(3.87)".to_owned(),
        raters: "412,345 Ratings".to_owned(),
        date: "Added 06/02/10".to_owned(),
        description: "Brewed with 100% Centennial hops.".to_owned(),
    }
}

#[test]
fn normalize_beer_parses_every_field() {
    let beer = normalize_beer(&raw_beer()).unwrap();
    assert_eq!(beer.id, "4473");
    assert_eq!(beer.name, "Two Hearted Ale");
    assert_eq!(beer.abv, Some(7.0));
    assert_eq!(beer.ibu, Some(55.0));
    assert_eq!(beer.rating, Some(3.87));
    assert_eq!(beer.raters, Some(412_345));
    assert_eq!(beer.added_on, NaiveDate::from_ymd_opt(2010, 6, 2));
}

#[test]
fn normalize_beer_keeps_unparseable_fields_as_none() {
    let mut raw = raw_beer();
    raw.ibu = "N/A IBU".to_owned();
    raw.date = String::new();

    let beer = normalize_beer(&raw).unwrap();
    assert_eq!(beer.ibu, None);
    assert_eq!(beer.added_on, None);
    assert_eq!(beer.abv, Some(7.0));
}

#[test]
fn normalize_beer_trims_text_fields() {
    let mut raw = raw_beer();
    raw.name = "  Two Hearted Ale\n".to_owned();
    let beer = normalize_beer(&raw).unwrap();
    assert_eq!(beer.name, "Two Hearted Ale");
}

#[test]
fn normalize_beer_rejects_empty_id() {
    let mut raw = raw_beer();
    raw.id = " ".to_owned();
    let err = normalize_beer(&raw).unwrap_err();
    assert!(matches!(err, ScraperError::Normalization { .. }));
}
