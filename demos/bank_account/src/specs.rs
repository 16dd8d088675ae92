//! Behaviour of [`Account`] written as a nestspec suite.

use std::cell::RefCell;

use nestspec::{BuildError, ExampleContext, Outcome, Overrides, Suite, check, check_eq};

use crate::{Account, AccountError};

/// Name of the mutable account binding shared by the nested groups.
const ACCOUNT: &str = "account";

fn account(ctx: &ExampleContext<'_>) -> Outcome<std::rc::Rc<RefCell<Account>>> {
    ctx.get::<RefCell<Account>>(ACCOUNT)
}

fn fresh_account(_: &ExampleContext<'_>) -> Outcome<RefCell<Account>> {
    Ok(RefCell::new(Account::default()))
}

/// Assembles the account suite.
///
/// # Errors
///
/// Returns a [`BuildError`] when a shared template is missing or included
/// recursively.
pub fn suite() -> Result<Suite, BuildError> {
    let mut builder = Suite::builder();
    builder.register_default_subject::<Account>();
    builder.register_template("a refused amount", |group| {
        group.it("is refused without touching the balance", |ctx| {
            let amount = ctx.value::<i64>("amount")?;
            let subject = account(ctx)?;
            let before = subject.borrow().balance();
            let outcome = subject.borrow_mut().deposit(amount);
            check(
                outcome == Err(AccountError::NonPositiveAmount(amount)),
                format!("a deposit of {amount} should be refused"),
            )?;
            check_eq(subject.borrow().balance(), before)
        });
    });

    builder.describe("Account", |spec| {
        spec.it("opens with a zero balance", |ctx| {
            check_eq(ctx.subject::<Account>()?.balance(), 0)
        });

        spec.describe("#deposit", |deposit| {
            deposit.define_named_subject(ACCOUNT, fresh_account);
            deposit.it("adds to the balance", |ctx| {
                let subject = ctx.subject::<RefCell<Account>>()?;
                subject.borrow_mut().deposit(50)?;
                check_eq(subject.borrow().balance(), 50)
            });
            deposit.context("with nothing", |zero| {
                zero.include_shared("a refused amount", Overrides::new().value("amount", 0_i64));
            });
            deposit.behaves_like("a refused amount", Overrides::new().value("amount", -5_i64));
        });

        spec.describe("#withdraw", |withdraw| {
            withdraw.define_named_subject(ACCOUNT, fresh_account);
            withdraw.define_eager_binding("opening deposit", |ctx| {
                account(ctx)?.borrow_mut().deposit(100)?;
                Ok(100_i64)
            });
            withdraw.it("subtracts from the balance", |ctx| {
                let subject = account(ctx)?;
                subject.borrow_mut().withdraw(30)?;
                check_eq(subject.borrow().balance(), 70)
            });
            withdraw.it("refuses to overdraw", |ctx| {
                let opening = ctx.value::<i64>("opening deposit")?;
                let outcome = account(ctx)?.borrow_mut().withdraw(opening + 1);
                check_eq(
                    outcome,
                    Err(AccountError::InsufficientFunds {
                        balance: opening,
                        requested: opening + 1,
                    }),
                )
            });
            withdraw.context("when frozen", |frozen| {
                frozen.before(|ctx| {
                    account(ctx)?.borrow_mut().freeze();
                    Ok(())
                });
                frozen.it("refuses every amount", |ctx| {
                    check_eq(account(ctx)?.borrow_mut().withdraw(1), Err(AccountError::Frozen))
                });
            });
        });

        spec.describe("#transfer", |transfer| {
            transfer.pending("moves funds between two accounts");
        });
    });
    builder.build()
}
