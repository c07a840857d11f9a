//! Tests for the filter expression language

use rstest::rstest;

use lfmerge::domain::{Expression, LayerRecord};

fn layer(name: &str, color: i16, linetype: &str, frozen: bool) -> LayerRecord {
    LayerRecord {
        name: name.to_string(),
        color,
        linetype: linetype.to_string(),
        frozen,
        locked: false,
    }
}

#[rstest]
#[case("NAME == \"A-WALL*\"", "A-WALL-FULL", true)]
#[case("NAME == \"A-WALL*\"", "S-GRID", false)]
#[case("NAME == \"a-wall*\"", "A-WALL", true)] // patterns ignore case
#[case("NAME == \"?-WALL\"", "A-WALL", true)]
#[case("NAME == \"?-WALL\"", "AB-WALL", false)]
#[case("NAME != \"A*\"", "S-GRID", true)]
#[case("NAME != \"A*\"", "A-WALL", false)]
fn given_name_pattern_when_matching_then_wildcards_apply(
    #[case] expr: &str,
    #[case] name: &str,
    #[case] expected: bool,
) {
    let expr = Expression::parse(expr).unwrap();
    assert_eq!(expr.matches(&layer(name, 7, "Continuous", false)), expected);
}

#[rstest]
#[case("COLOR == 1 AND FROZEN == FALSE", 1, false, true)]
#[case("COLOR == 1 AND FROZEN == FALSE", 1, true, false)]
#[case("COLOR == 1 OR FROZEN == TRUE", 3, true, true)]
#[case("NOT COLOR == 1", 3, false, true)]
fn given_property_comparisons_when_matching_then_operators_combine(
    #[case] expr: &str,
    #[case] color: i16,
    #[case] frozen: bool,
    #[case] expected: bool,
) {
    let expr = Expression::parse(expr).unwrap();
    assert_eq!(
        expr.matches(&layer("X", color, "Continuous", frozen)),
        expected
    );
}

#[test]
fn given_grouped_expression_when_matching_then_parens_override_precedence() {
    let expr = Expression::parse("(NAME == \"A*\" OR NAME == \"S*\") AND LINETYPE == Dashed")
        .unwrap();
    assert!(expr.matches(&layer("A-WALL", 7, "Dashed", false)));
    assert!(!expr.matches(&layer("A-WALL", 7, "Continuous", false)));
    assert!(!expr.matches(&layer("M-PIPE", 7, "Dashed", false)));
}

#[test]
fn given_parsed_expression_then_original_text_is_kept() {
    let text = "NAME == \"A-WALL*\"";
    let expr = Expression::parse(text).unwrap();
    assert_eq!(expr.text(), text);
}

#[rstest]
#[case("WEIGHT == 1")] // unknown field
#[case("COLOR == red")]
#[case("FROZEN == maybe")]
#[case("NAME == \"open")]
#[case("NAME ==")]
#[case("NAME = \"A\"")] // single '=' is not an operator
#[case("NAME == \"A\" NAME == \"B\"")] // missing connective
fn given_malformed_expression_when_parsing_then_error(#[case] text: &str) {
    assert!(Expression::parse(text).is_err());
}
