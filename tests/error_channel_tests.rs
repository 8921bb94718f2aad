//! ErrorChannel behaviour shared by every carrier.

use purefx::control::Either;
use purefx::effect::{EffectError, ErrorChannel, IO, IOKind};
use purefx::typeclass::{Monad, OptionKind, ResultKind};
use rstest::rstest;

type Http = ResultKind<u16>;

fn not_found_default(code: &u16) -> Option<&'static str> {
    (*code == 404).then_some("default page")
}

// =============================================================================
// Result
// =============================================================================

#[rstest]
#[case(Err(404), Ok("default page"))]
#[case(Err(500), Err(500))]
#[case(Ok("page"), Ok("page"))]
fn recover_applies_only_matching_handlers(#[case] input: Result<&'static str, u16>, #[case] expected: Result<&'static str, u16>) {
    assert_eq!(Http::recover(input, not_found_default), expected);
}

#[rstest]
fn recover_with_can_fail_differently() {
    let result = Http::recover_with(Err::<i32, _>(503), |code| (*code >= 500).then_some(Err(599)));
    assert_eq!(result, Err(599));
}

#[rstest]
fn handle_error_with_raise_is_handler_of_error() {
    let raised: Result<usize, u16> = Http::raise_error(418);
    assert_eq!(Http::handle_error_with(raised, |code| Ok(usize::from(code))), Ok(418));
}

#[rstest]
fn from_either_raises_left() {
    assert_eq!(Http::from_either(Either::<u16, i32>::Left(401)), Err(401));
    assert_eq!(Http::from_either(Either::<u16, i32>::Right(1)), Ok(1));
}

#[rstest]
fn raise_short_circuits_flat_map() {
    let raised: Result<i32, u16> = Http::raise_error(400);
    assert_eq!(Http::flat_map(raised, |n| Ok(n + 1)), Err(400));
}

// =============================================================================
// Option
// =============================================================================

#[rstest]
fn option_channel_uses_none_as_the_error() {
    let missing: Option<i32> = OptionKind::raise_error(());
    assert_eq!(missing, None);
    assert_eq!(OptionKind::handle_error(missing, |()| 0), Some(0));
    assert_eq!(OptionKind::attempt(Some(1)), Some(Either::Right(1)));
    assert_eq!(OptionKind::attempt::<i32>(None), Some(Either::Left(())));
}

// =============================================================================
// IO
// =============================================================================

#[rstest]
#[case("timeout", Ok(0))]
#[case("disk", Err(EffectError::raised("disk")))]
fn io_recover_reraises_unmatched(#[case] message: &str, #[case] expected: Result<i32, EffectError>) {
    let failed: IO<i32> = IOKind::raise_error(EffectError::raised(message));
    let recovered = IOKind::recover(failed, |error| (error.message() == Some("timeout")).then_some(0));
    assert_eq!(recovered.run_unsafe(), expected);
}

#[rstest]
fn io_recover_with_runs_the_replacement_lazily() {
    let failed: IO<i32> = IOKind::raise_error(EffectError::Cancelled);
    let recovered = IOKind::recover_with(failed, |error| error.is_cancelled().then(|| IO::new(|| 7)));
    assert_eq!(recovered.run_unsafe(), Ok(7));
}

#[rstest]
fn io_redeem_folds_both_outcomes() {
    let describe = |io: IO<i32>| {
        IOKind::redeem(io, |error| format!("failed: {error}"), |n| format!("got {n}")).run_unsafe()
    };

    assert_eq!(describe(IO::pure(1)), Ok("got 1".to_string()));
    assert_eq!(describe(IO::fail(EffectError::raised("x"))), Ok("failed: effect raised: x".to_string()));
}

#[rstest]
fn io_ensure_rejects_values() {
    let checked = IOKind::ensure(IO::pure(-1), |n| *n >= 0, || EffectError::raised("negative"));
    assert_eq!(checked.run_unsafe(), Err(EffectError::raised("negative")));
}

#[rstest]
fn io_panic_is_recoverable() {
    let panicking: IO<i32> = IO::new(|| panic!("kaboom"));
    let recovered = IOKind::handle_error(panicking, |error| match error {
        EffectError::Panicked { message } => i32::try_from(message.len()).unwrap_or(-1),
        _ => -1,
    });
    assert_eq!(recovered.run_unsafe(), Ok(6));
}
