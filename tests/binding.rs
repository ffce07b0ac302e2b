mod common;
use common::*;
use fiql_bind::*;
use jiff::Timestamp;
use rust_decimal::Decimal;
use std::str::FromStr;

fn constraint(input: &str) -> Constraint {
    match parser().expression(input).unwrap() {
        Expr::Leaf(constraint) => constraint,
        other => panic!("expected a single comparison, got: {other:?}"),
    }
}

#[test]
fn arguments_take_the_accessor_type() {
    assert_eq!(constraint("year=gt=2003").value, Value::I32(2003));
    assert_eq!(
        constraint("budget=le=1.5e8").value,
        Value::Decimal(Decimal::from(150_000_000))
    );
    assert_eq!(
        constraint("budget==99.95").value,
        Value::Decimal(Decimal::from_str("99.95").unwrap())
    );
    assert_eq!(
        constraint("director.lastName==Nolan").value,
        Value::Text("Nolan".into())
    );
    assert_eq!(constraint("actor.oscars!=0").value, Value::U32(0));
}

#[test]
fn quotes_stay_part_of_the_argument() {
    let bound = constraint("name==\"Kill Bill\"");
    assert_eq!(bound.path, "name");
    assert_eq!(bound.operator, EQ);
    assert_eq!(bound.value, Value::Text("\"Kill Bill\"".into()));
    assert_eq!(bound.to_string(), "name == \"Kill Bill\" (String)");
}

#[test]
fn timestamp_argument_with_colon_offset() {
    let bound = constraint("release=ge=2014-11-20T10:15:30.000+01:00");
    let expected: Timestamp = "2014-11-20T09:15:30Z".parse().unwrap();
    assert_eq!(bound.value, Value::Timestamp(expected));
    assert_eq!(bound.kind, ConditionKind::GreaterOrEquals);
}

#[test]
fn timestamp_argument_as_duration() {
    let now = Timestamp::now();
    let Value::Timestamp(bound) = constraint("release=lt=P7D").value else {
        panic!("expected a timestamp");
    };
    assert!(bound > now);
}

#[test]
fn string_typed_dates_are_not_cast() {
    assert_eq!(
        constraint("distributionDate==2014-11-20").value,
        Value::Text("2014-11-20".into())
    );
}

#[test]
fn tree_shape_survives_binding() {
    let expr = parser()
        .expression("name==Heat;(year=lt=1990,year=gt=1999)")
        .unwrap();
    let Expr::And(parts) = &expr else {
        panic!("expected And, got: {expr:?}");
    };
    assert!(parts[0].is_leaf());
    assert_eq!(parts[1].children().len(), 2);
    assert_eq!(
        expr.to_string(),
        "AND:[name == Heat (String), OR:[year =lt= 1990 (i32), year =gt= 1999 (i32)]]"
    );
}

#[test]
fn unknown_selector() {
    let err = parser().expression("title==Heat").unwrap_err();
    match &err {
        QueryError::Access(AccessError::UnknownAccessor {
            record, accessor, ..
        }) => {
            assert_eq!(record, "Movie");
            assert_eq!(accessor, "title");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!err.is_configuration());

    assert!(matches!(
        parser().expression("director.middleName==Q"),
        Err(QueryError::Access(AccessError::UnknownAccessor { .. }))
    ));
}

#[test]
fn uncastable_arguments() {
    assert!(matches!(
        parser().expression("year=gt=recent"),
        Err(QueryError::Cast(CastError::Primitive { .. }))
    ));
    assert!(matches!(
        parser().expression("budget==lots"),
        Err(QueryError::Cast(CastError::Numeric { .. }))
    ));
    assert!(matches!(
        parser().expression("release==someday"),
        Err(QueryError::Cast(CastError::Date { .. }))
    ));
    for input in [
        "release==1 day",
        "release==2014-11-20T10:15:30+01:00",
    ] {
        assert!(
            matches!(
                parser().expression(input),
                Err(QueryError::Cast(CastError::Date { .. }))
            ),
            "{input:?}"
        );
    }
    for input in [
        "budget==0.123456789012345678901234567890123",
        "budget==123456789012345678901234567890",
    ] {
        assert!(
            matches!(
                parser().expression(input),
                Err(QueryError::Cast(CastError::Numeric { .. }))
            ),
            "{input:?}"
        );
    }
    match parser().expression("director==Nolan") {
        Err(QueryError::Cast(CastError::Primitive { target, .. })) => {
            assert_eq!(target, "Director")
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn syntax_errors_pass_through() {
    assert!(matches!(
        parser().expression("(name==Heat"),
        Err(QueryError::Syntax(ParseError::UnmatchedBracket { position: 0 }))
    ));
    assert!(matches!(
        parser().expression("name==Heat;"),
        Err(QueryError::Syntax(ParseError::DanglingOperator { .. }))
    ));
    let deep = format!("{}name==Heat{}", "(".repeat(5_000), ")".repeat(5_000));
    assert!(matches!(
        parser().parse(&deep),
        Err(QueryError::Syntax(ParseError::NestingTooDeep { limit: MAX_NESTING, .. }))
    ));
    // `>` is not a registered operator.
    assert!(matches!(
        parser().expression("year>2003"),
        Err(QueryError::Syntax(ParseError::InvalidComparison { .. }))
    ));
}

#[test]
fn misdeclared_record_is_a_configuration_error() {
    let err = Parser::<Misdeclared>::new(operators()).unwrap_err();
    assert!(err.is_configuration());
    assert!(matches!(
        err,
        QueryError::Catalog(CatalogError::AccessorTypeMismatch { ref accessor, .. })
            if accessor == "runtime"
    ));
}

#[test]
fn operators_are_snapshotted() {
    let mut custom = Operators::new();
    let parser = Parser::<Movie>::new(&custom).unwrap();
    custom.register("=like=", ConditionKind::Custom).unwrap();

    assert!(matches!(
        parser.expression("name=like=Heat"),
        Err(QueryError::Syntax(ParseError::InvalidComparison { .. }))
    ));

    let parser = Parser::<Movie>::new(&custom).unwrap();
    let Expr::Leaf(bound) = parser.expression("name=like=Heat").unwrap() else {
        panic!("expected a leaf");
    };
    assert_eq!(bound.kind, ConditionKind::Custom);
    assert_eq!(bound.value, Value::Text("Heat".into()));
}
