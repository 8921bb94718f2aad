//! Integration tests and laws for Trampoline.

use purefx::control::{Either, Trampoline};
use proptest::prelude::*;
use rstest::rstest;

fn factorial(n: u64, accumulator: u128) -> Trampoline<u128> {
    if n == 0 {
        Trampoline::done(accumulator)
    } else {
        Trampoline::suspend(move || factorial(n - 1, accumulator * u128::from(n)))
    }
}

fn sum_to(n: u64) -> Trampoline<u64> {
    if n == 0 {
        Trampoline::done(0)
    } else {
        Trampoline::suspend(move || sum_to(n - 1)).map(move |rest| rest + n)
    }
}

fn fibonacci(n: u64) -> Trampoline<u64> {
    if n < 2 {
        Trampoline::done(n)
    } else {
        Trampoline::suspend(move || fibonacci(n - 1))
            .flat_map(move |a| fibonacci(n - 2).map(move |b| a + b))
    }
}

// =============================================================================
// Recursion
// =============================================================================

#[rstest]
#[case(0, 1)]
#[case(5, 120)]
#[case(20, 2_432_902_008_176_640_000)]
fn factorial_is_tail_recursive(#[case] n: u64, #[case] expected: u128) {
    assert_eq!(factorial(n, 1).run(), expected);
}

#[rstest]
fn non_tail_recursion_is_stack_safe() {
    assert_eq!(sum_to(100_000).run(), 5_000_050_000);
}

#[rstest]
#[case(0, 0)]
#[case(1, 1)]
#[case(20, 6765)]
fn branching_recursion(#[case] n: u64, #[case] expected: u64) {
    assert_eq!(fibonacci(n).run(), expected);
}

#[rstest]
fn then_discards_the_first_result() {
    assert_eq!(Trampoline::done("ignored").then(Trampoline::done(1)).run(), 1);
}

#[rstest]
fn and_then_is_flat_map() {
    assert_eq!(Trampoline::pure(2).and_then(|n| Trampoline::delay(move || n * 21)).run(), 42);
}

#[rstest]
fn resume_counts_deferred_steps() {
    let mut steps = 0;
    let mut current = sum_to(10);
    let result = loop {
        match current.resume() {
            Either::Left(thunk) => {
                steps += 1;
                current = thunk.force();
            }
            Either::Right(value) => break value,
        }
    };
    assert_eq!(result, 55);
    assert_eq!(steps, 10);
}

#[rstest]
fn debug_does_not_force() {
    let trampoline = Trampoline::<i32>::delay(|| panic!("forced"));
    assert_eq!(format!("{trampoline:?}"), "Trampoline(Program(Suspend))");
}

// =============================================================================
// Laws
// =============================================================================

proptest! {
    /// Left Identity Law: done(a).flat_map(f) == f(a)
    #[test]
    fn prop_trampoline_left_identity(value: i64) {
        let function = |n: i64| Trampoline::delay(move || n.wrapping_mul(3));
        prop_assert_eq!(Trampoline::done(value).flat_map(function).run(), function(value).run());
    }

    /// Right Identity Law: m.flat_map(done) == m
    #[test]
    fn prop_trampoline_right_identity(value: i64) {
        prop_assert_eq!(Trampoline::delay(move || value).flat_map(Trampoline::done).run(), value);
    }

    /// Associativity Law: m.flat_map(f).flat_map(g) == m.flat_map(|x| f(x).flat_map(g))
    #[test]
    fn prop_trampoline_associativity(value: i64) {
        let function1 = |n: i64| Trampoline::done(n.wrapping_add(1));
        let function2 = |n: i64| Trampoline::suspend(move || Trampoline::done(n.wrapping_mul(2)));

        let left_result = Trampoline::done(value).flat_map(function1).flat_map(function2).run();
        let right_result = Trampoline::done(value)
            .flat_map(move |x| function1(x).flat_map(function2))
            .run();

        prop_assert_eq!(left_result, right_result);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Deep recursion through suspend never overflows.
    #[test]
    fn prop_trampoline_stack_safety(depth in 1_000_u64..50_000_u64) {
        prop_assert_eq!(sum_to(depth).run(), depth * (depth + 1) / 2);
    }
}
