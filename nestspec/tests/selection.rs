//! Selection by description, file and line, including template inclusion
//! sites.
#![expect(
    clippy::expect_used,
    reason = "tests panic to surface assembly mistakes"
)]

use nestspec::{Criterion, Overrides, Runner, Suite, Verdict, select};
use rstest::{fixture, rstest};

/// A suite plus the source lines worth selecting.
struct Lines {
    suite: Suite,
    balance_group: u32,
    zero_example: u32,
    include_site: u32,
}

#[fixture]
fn account() -> Lines {
    let mut builder = Suite::builder();
    builder.register_template("a non-negative amount", |group| {
        group.it("is not negative", |ctx| {
            let amount = ctx.value::<i64>("amount")?;
            nestspec::check(amount >= 0, format!("{amount} is negative"))
        });
    });
    let mut lines = (0, 0, 0);
    builder.describe("Account", |account| {
        account.define_binding("balance", |_| Ok(0_i64));
        lines.0 = line!() + 1;
        account.describe("#balance", |balance| {
            lines.1 = line!() + 1;
            balance.it("is zero initially", |ctx| {
                nestspec::check_eq(ctx.value::<i64>("balance")?, 0)
            });
            balance.it("is an integer", |_| Ok(()));
        });
        account.describe("#deposit", |deposit| {
            lines.2 = line!() + 1;
            deposit.include_shared("a non-negative amount", Overrides::new().value("amount", 5_i64));
        });
    });
    Lines {
        suite: builder.build().expect("build suite"),
        balance_group: lines.0,
        zero_example: lines.1,
        include_site: lines.2,
    }
}

fn descriptions(suite: &Suite, criteria: &[Criterion]) -> Vec<String> {
    select(suite, criteria)
        .iter()
        .map(|selected| suite.full_description(selected.example()))
        .collect()
}

#[rstest]
fn no_criteria_select_everything_in_definition_order(account: Lines) {
    assert_eq!(
        descriptions(&account.suite, &[]),
        [
            "Account #balance is zero initially",
            "Account #balance is an integer",
            "Account #deposit is not negative",
        ]
    );
}

#[rstest]
fn description_substrings_select_matching_examples(account: Lines) {
    let selected = descriptions(&account.suite, &[Criterion::description("#balance")]);
    assert_eq!(selected.len(), 2);
    assert!(selected.iter().all(|description| description.contains("#balance")));
}

#[rstest]
fn example_lines_select_one_example(account: Lines) {
    let selected = descriptions(&account.suite, &[Criterion::Line(account.zero_example)]);
    assert_eq!(selected, ["Account #balance is zero initially"]);
}

#[rstest]
fn group_lines_select_the_whole_group(account: Lines) {
    let selected = descriptions(
        &account.suite,
        &[Criterion::location(file!(), Some(account.balance_group))],
    );
    assert_eq!(selected.len(), 2);
}

#[rstest]
fn bare_group_lines_select_nothing(account: Lines) {
    let selected = descriptions(&account.suite, &[Criterion::Line(account.balance_group)]);
    assert!(selected.is_empty());
}

#[rstest]
fn inclusion_sites_select_template_examples(account: Lines) {
    let selected = descriptions(&account.suite, &[Criterion::Line(account.include_site)]);
    assert_eq!(selected, ["Account #deposit is not negative"]);
}

#[rstest]
fn criteria_are_combined_inclusively(account: Lines) {
    let selected = descriptions(
        &account.suite,
        &[
            Criterion::Line(account.zero_example),
            Criterion::description("#deposit"),
        ],
    );
    assert_eq!(selected.len(), 2);
}

#[rstest]
#[case("tests/selection.rs", 3)]
#[case("selection.rs", 3)]
#[case("tests/other.rs", 0)]
fn file_criteria_match_trailing_components(
    account: Lines,
    #[case] path: &str,
    #[case] expected: usize,
) {
    assert_eq!(
        select(&account.suite, &[Criterion::location(path, None)]).len(),
        expected
    );
}

#[rstest]
fn filtered_runs_execute_only_the_selection(account: Lines) {
    let selection = select(&account.suite, &[Criterion::description("is zero")]);
    let report = Runner::new().run(&account.suite, &selection);
    let outcomes: Vec<(&str, &Verdict)> = report
        .outcomes()
        .map(|(description, verdict, _)| (description, verdict))
        .collect();
    assert_eq!(
        outcomes,
        [("Account #balance is zero initially", &Verdict::Passed)]
    );
}
