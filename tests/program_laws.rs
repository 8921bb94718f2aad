//! Property-based tests for Program laws.
//!
//! - Monad laws, observed through `fold_map` into `Identity`
//! - Re-association: left-nested and right-associated chains agree

use purefx::control::{IdentityInterpreter, Program};
use purefx::typeclass::{Identity, IdentityKind};
use proptest::prelude::*;

type Pure<A> = Program<IdentityKind, A>;

fn interpret<A: Send + 'static>(program: Pure<A>) -> A {
    program.fold_map::<IdentityKind, _>(IdentityInterpreter).into_inner()
}

fn add_effect(amount: i64) -> impl Fn(i64) -> Pure<i64> + Clone + Send + 'static {
    move |n| Program::lift(Identity(n.wrapping_add(amount)))
}

fn left_nested(values: &[i64]) -> Pure<i64> {
    values
        .iter()
        .copied()
        .fold(Pure::pure(0), |program, value| program.flat_map(add_effect(value)))
}

fn right_associated(values: Vec<i64>) -> Pure<i64> {
    fn go(start: i64, mut rest: std::vec::IntoIter<i64>) -> Pure<i64> {
        match rest.next() {
            None => Program::pure(start),
            Some(value) => add_effect(value)(start).flat_map(move |next| go(next, rest)),
        }
    }
    go(0, values.into_iter())
}

// =============================================================================
// Monad Laws
// =============================================================================

proptest! {
    /// Left Identity Law: pure(a).flat_map(f) == f(a)
    #[test]
    fn prop_program_left_identity(value: i64, amount: i64) {
        let function = add_effect(amount);

        let left_result = interpret(Pure::pure(value).flat_map(function.clone()));
        let right_result = interpret(function(value));

        prop_assert_eq!(left_result, right_result);
    }

    /// Right Identity Law: m.flat_map(pure) == m
    #[test]
    fn prop_program_right_identity(value: i64) {
        let left_result = interpret(Pure::lift(Identity(value)).flat_map(Program::pure));
        let right_result = interpret(Pure::lift(Identity(value)));

        prop_assert_eq!(left_result, right_result);
    }

    /// Associativity Law: m.flat_map(f).flat_map(g) == m.flat_map(|x| f(x).flat_map(g))
    #[test]
    fn prop_program_associativity(value: i64, first: i64, second: i64) {
        let function1 = add_effect(first);
        let function2 = add_effect(second);

        let left_result = interpret(
            Pure::lift(Identity(value))
                .flat_map(function1.clone())
                .flat_map(function2.clone()),
        );
        let right_result = interpret(
            Pure::lift(Identity(value)).flat_map(move |x| function1(x).flat_map(function2)),
        );

        prop_assert_eq!(left_result, right_result);
    }
}

// =============================================================================
// Functor Laws
// =============================================================================

proptest! {
    /// Functor Identity Law: map(id) == id
    #[test]
    fn prop_program_functor_identity(value: i64) {
        prop_assert_eq!(interpret(Pure::lift(Identity(value)).map(|x| x)), value);
    }

    /// Functor Composition Law: map(f).map(g) == map(g . f)
    #[test]
    fn prop_program_functor_composition(value: i64) {
        let function1 = |n: i64| n.wrapping_mul(3);
        let function2 = |n: i64| n.wrapping_sub(7);

        let left_result = interpret(Pure::lift(Identity(value)).map(function1).map(function2));
        let right_result = interpret(Pure::lift(Identity(value)).map(move |x| function2(function1(x))));

        prop_assert_eq!(left_result, right_result);
    }
}

// =============================================================================
// Re-association
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Left-nested and right-associated chains of the same steps agree.
    #[test]
    fn prop_left_and_right_association_agree(values in prop::collection::vec(any::<i64>(), 0..500)) {
        let left_result = interpret(left_nested(&values));
        let right_result = interpret(right_associated(values));

        prop_assert_eq!(left_result, right_result);
    }

    /// Stepping before folding never changes the result.
    #[test]
    fn prop_step_preserves_result(values in prop::collection::vec(any::<i64>(), 0..200)) {
        let expected = interpret(left_nested(&values));
        let stepped = left_nested(&values).step().step();

        prop_assert_eq!(interpret(stepped), expected);
    }
}
