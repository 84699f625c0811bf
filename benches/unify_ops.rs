//! Benchmarks for unification and belief queries.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use akh_bdi::agent::Agent;
use akh_bdi::env::Env;
use akh_bdi::exec::{ExecContext, for_each_solution};
use akh_bdi::ground::{self, FreezeMemo};
use akh_bdi::intention::Intention;
use akh_bdi::query::Query;
use akh_bdi::scope::Scope;
use akh_bdi::term::{Term, Var};
use akh_bdi::trail::{Trail, push_choicepoint, reroll};
use akh_bdi::unify::unify;

fn nested(depth: usize, leaf: Term) -> Term {
    (0..depth).fold(leaf, |inner, i| {
        Term::literal("node", [Term::int(i as i64), inner, Term::atom("x")])
    })
}

fn bench_unify(c: &mut Criterion) {
    let ground = nested(32, Term::atom("leaf"));
    let open = nested(32, Term::var());

    c.bench_function("unify_ground_depth32", |bench| {
        bench.iter(|| {
            let mut scope = Scope::new();
            let mut trail = Trail::new();
            black_box(unify(&ground, &ground, &mut scope, &mut trail))
        })
    });

    c.bench_function("unify_bind_and_reroll_depth32", |bench| {
        let mut scope = Scope::new();
        let mut trail = Trail::new();
        bench.iter(|| {
            let cp = push_choicepoint(&mut trail);
            black_box(unify(&open, &ground, &mut scope, &mut trail));
            reroll(&mut scope, &mut trail, cp).unwrap();
        })
    });
}

fn bench_freeze(c: &mut Criterion) {
    let v = Var::fresh();
    let term = nested(32, Term::Var(v));
    let mut scope = Scope::new();
    let mut trail = Trail::new();
    unify(&Term::Var(v), &Term::atom("leaf"), &mut scope, &mut trail);

    c.bench_function("freeze_depth32", |bench| {
        bench.iter(|| black_box(ground::freeze(&term, &scope, &mut FreezeMemo::new())))
    });
}

fn bench_query(c: &mut Criterion) {
    let env = Env::new();
    let mut agent = Agent::new("bench");
    for n in 0..1000 {
        agent
            .beliefs
            .add(Term::literal("item", [Term::int(n), Term::int(n % 7)]));
    }

    c.bench_function("query_1000_beliefs_filtered", |bench| {
        bench.iter(|| {
            let mut intention = Intention::new();
            let mut cx = ExecContext::new(&env, &mut agent, &mut intention);
            let goal = Term::literal("item", [Term::var(), Term::int(3)]);
            black_box(for_each_solution(&mut Query::new(goal), &mut cx, |_| Ok(())).unwrap())
        })
    });
}

criterion_group!(benches, bench_unify, bench_freeze, bench_query);
criterion_main!(benches);
