//! Integration tests for Program construction and the resumption engine.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use purefx::control::{
    CoproductKind, Either, IdentityInterpreter, InjectLeft, InjectRight, Interpreter, Lifted, Or, Program, ProgramKind,
    Shape,
};
use purefx::effect::{EffectError, IO, IOKind};
use purefx::typeclass::{Identity, IdentityKind, Monad, OptionKind};
use rstest::rstest;

type Pure<A> = Program<IdentityKind, A>;

// =============================================================================
// Construction
// =============================================================================

#[rstest]
#[case(Pure::pure(1), Shape::Done)]
#[case(Pure::lift(Identity(1)), Shape::Suspend)]
#[case(Pure::pure(1).map(|n| n + 1), Shape::Bind)]
#[case(Pure::defer(|| Program::pure(1)), Shape::Bind)]
fn constructors_build_the_expected_shape(#[case] program: Pure<i32>, #[case] expected: Shape) {
    assert_eq!(program.shape(), expected);
}

#[rstest]
fn building_a_program_runs_no_effect() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let program = Program::<IOKind, usize>::lift(IO::new(move || counter.fetch_add(1, Ordering::SeqCst)))
        .flat_map(|n| Program::pure(n + 10))
        .map(|n| n * 2);

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(program.run().run_unsafe(), Ok(20));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[rstest]
fn map2_runs_left_to_right() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let first_log = Arc::clone(&log);
    let second_log = Arc::clone(&log);

    let first = Program::<IOKind, i32>::lift(IO::new(move || {
        first_log.lock().unwrap().push("first");
        1
    }));
    let second = Program::<IOKind, i32>::lift(IO::new(move || {
        second_log.lock().unwrap().push("second");
        2
    }));

    let result = first.map2(second, |a, b| a * 10 + b).run().run_unsafe();

    assert_eq!(result, Ok(12));
    assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
}

// =============================================================================
// Defer
// =============================================================================

#[rstest]
fn defer_supplier_runs_once_at_interpretation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let program = Pure::defer(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Program::pure("built")
    });

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(program.fold_map::<IdentityKind, _>(IdentityInterpreter), Identity("built"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[rstest]
fn defer_allows_self_referential_definitions() {
    fn ones(remaining: u32) -> Pure<u32> {
        if remaining == 0 {
            Program::pure(0)
        } else {
            Program::lift(Identity(1)).flat_map(move |one| Program::defer(move || ones(remaining - 1)).map(move |rest| one + rest))
        }
    }

    assert_eq!(ones(10_000).run(), Identity(10_000));
}

// =============================================================================
// Resume and Step
// =============================================================================

#[rstest]
fn resume_walks_one_effect_at_a_time() {
    let program = Pure::lift(Identity(1))
        .flat_map(|n| Program::lift(Identity(n + 1)))
        .map(|n| n * 100);

    let mut suspensions = 0;
    let mut current = program;
    let result = loop {
        match current.resume() {
            Either::Left(Identity(rest)) => {
                suspensions += 1;
                current = rest;
            }
            Either::Right(value) => break value,
        }
    };

    assert_eq!(result, 200);
    assert_eq!(suspensions, 2);
}

#[rstest]
fn resume_done_is_right() {
    assert_eq!(Pure::pure(3).map(|n| n + 1).resume().right(), Some(4));
}

#[rstest]
fn step_leaves_a_suspended_source() {
    let stepped = Pure::pure(1)
        .map(|n| n + 1)
        .flat_map(|n| Program::lift(Identity(n)))
        .map(|n| n + 1)
        .step();
    assert_eq!(stepped.shape(), Shape::Bind);
}

#[rstest]
fn step_is_idempotent_on_normal_forms() {
    let once = Pure::lift(Identity(4)).map(|n| n * 2).step();
    let twice = once.step();
    assert_eq!(twice.shape(), Shape::Bind);
    assert_eq!(twice.run(), Identity(8));
}

// =============================================================================
// Fold Map
// =============================================================================

struct Counting {
    applied: Arc<AtomicUsize>,
}

impl Interpreter<IdentityKind, OptionKind> for Counting {
    fn apply<T: Send + 'static>(&mut self, effect: Identity<T>) -> Option<T> {
        self.applied.fetch_add(1, Ordering::SeqCst);
        Some(effect.into_inner())
    }
}

#[rstest]
fn fold_map_interprets_each_effect_once() {
    let applied = Arc::new(AtomicUsize::new(0));
    let program = Pure::lift(Identity(1))
        .flat_map(|a| Program::lift(Identity(a + 1)))
        .flat_map(|b| Program::lift(Identity(b + 1)));

    let result = program.fold_map::<OptionKind, _>(Counting {
        applied: Arc::clone(&applied),
    });

    assert_eq!(result, Some(3));
    assert_eq!(applied.load(Ordering::SeqCst), 3);
}

#[rstest]
fn fold_map_short_circuits_in_the_target() {
    let reached = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&reached);

    let program = Program::<OptionKind, i32>::lift(None).map(move |n| {
        counter.fetch_add(1, Ordering::SeqCst);
        n
    });

    assert_eq!(program.run(), None);
    assert_eq!(reached.load(Ordering::SeqCst), 0);
}

#[rstest]
fn fold_map_failure_surfaces_through_the_carrier() {
    let program = Program::<IOKind, i32>::lift(IO::pure(1))
        .flat_map(|_| Program::lift(IO::fail(EffectError::raised("disk full"))))
        .map(|n: i32| n + 1);

    assert_eq!(program.run().run_unsafe(), Err(EffectError::raised("disk full")));
}

struct ToIO;

impl Interpreter<IdentityKind, IOKind> for ToIO {
    fn apply<T: Send + 'static>(&mut self, effect: Identity<T>) -> IO<T> {
        IO::pure(effect.into_inner())
    }
}

#[rstest]
fn fold_map_translates_between_carriers() {
    let program = Pure::lift(Identity(6)).map2(Pure::lift(Identity(7)), |a, b| a * b);
    assert_eq!(program.fold_map::<IOKind, _>(ToIO).run_unsafe(), Ok(42));
}

// =============================================================================
// Program as a Monad
// =============================================================================

#[rstest]
fn fold_map_into_another_program() {
    let program = Pure::lift(Identity(2)).flat_map(|n| Program::lift(Identity(n + 40)));
    let translated: Program<IOKind, i32> = program.fold_map::<ProgramKind<IOKind>, _>(Lifted::new(ToIO));
    assert_eq!(translated.shape(), Shape::Bind);
    assert_eq!(translated.run().run_unsafe(), Ok(42));
}

#[rstest]
fn lifted_translation_runs_nothing_until_the_result_runs() {
    let steps = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&steps);
    let program = Pure::lift(Identity(())).flat_map(move |()| {
        counter.fetch_add(1, Ordering::SeqCst);
        Program::pure(7)
    });

    let translated = program.fold_map::<ProgramKind<IOKind>, _>(Lifted::new(ToIO));
    assert_eq!(steps.load(Ordering::SeqCst), 0);
    assert_eq!(translated.run().run_unsafe(), Ok(7));
    assert_eq!(steps.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Combined Instruction Sets
// =============================================================================

type Console = CoproductKind<IdentityKind, IOKind>;

struct Immediate;

impl Interpreter<IdentityKind, IOKind> for Immediate {
    fn apply<T: Send + 'static>(&mut self, effect: Identity<T>) -> IO<T> {
        IO::pure(effect.into_inner())
    }
}

#[rstest]
fn injected_steps_are_routed_to_their_interpreter() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let writer = Arc::clone(&log);

    let program = Program::<Console, i32>::inject::<IdentityKind, _>(&InjectLeft, Identity(20)).flat_map(move |n| {
        Program::inject::<IOKind, _>(
            &InjectRight::direct(),
            IO::new(move || {
                writer.lock().unwrap().push(n);
                n + 22
            }),
        )
    });

    let io = program.fold_map::<IOKind, _>(Or::new(Immediate, IdentityInterpreter));
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(io.run_unsafe(), Ok(42));
    assert_eq!(*log.lock().unwrap(), vec![20]);
}

#[rstest]
fn injected_failure_short_circuits_the_combined_program() {
    let program = Program::<Console, i32>::inject::<IOKind, _>(
        &InjectRight::direct(),
        IO::fail(EffectError::raised("no input")),
    )
    .flat_map(|n| Program::inject::<IdentityKind, _>(&InjectLeft, Identity(n + 1)));

    let io = program.fold_map::<IOKind, _>(Or::new(Immediate, IdentityInterpreter));
    assert_eq!(io.run_unsafe(), Err(EffectError::raised("no input")));
}

#[rstest]
fn program_kind_monad_operations() {
    let program = ProgramKind::<IdentityKind>::map2(Program::pure(1), Program::lift(Identity(2)), |a, b| a + b);
    assert_eq!(program.run(), Identity(3));

    let flattened = ProgramKind::<IdentityKind>::flatten(Program::pure(Program::pure(5)));
    assert_eq!(flattened.run(), Identity(5));
}
