//! End-to-end integration tests for the argumentation engine.
//!
//! These tests drive the `Engine` facade and JSON rule documents through
//! knowledge base construction, argument building and both reasoners.

use aspic_engine::argument::{ArgumentStatus, AttackKind, ValuationKind};
use aspic_engine::config::ReasonerConfig;
use aspic_engine::document::RuleDocument;
use aspic_engine::engine::Engine;
use aspic_engine::error::{AspicError, KnowledgeBaseError};
use aspic_engine::reasoner::Semantics;
use aspic_engine::rule::Rule;
use aspic_engine::substitution::Substitution;
use aspic_engine::term::{BuiltinOp, Term, VarScope};

fn c(name: &str) -> Term {
    Term::constant(name).unwrap()
}

fn p(functor: &str, arg: Term) -> Term {
    Term::compound(functor, vec![arg]).unwrap()
}

fn engine_with(config: ReasonerConfig) -> Engine {
    Engine::new(config).unwrap()
}

fn test_engine() -> Engine {
    engine_with(ReasonerConfig::default())
}

/// `head(X) <~degree body(X)` in its own variable scope.
fn unary_rule(head: &str, body: &str, degree: f64) -> Rule {
    let mut scope = VarScope::new();
    let x = Term::var(scope.var("X"));
    Rule::new(p(head, x.clone()), vec![p(body, x)], degree).unwrap()
}

fn birds(engine: &mut Engine) {
    engine.add_rule(Rule::fact(p("bird", c("tweety"))).unwrap()).unwrap();
    engine.add_rule(unary_rule("fly", "bird", 0.8)).unwrap();
}

fn penguins(engine: &mut Engine) {
    birds(engine);
    engine.add_rule(Rule::fact(p("penguin", c("tweety"))).unwrap()).unwrap();
    engine.add_rule(unary_rule("~fly", "penguin", 0.9)).unwrap();
}

fn verdicts(engine: &Engine, goal: Term) -> Vec<bool> {
    engine
        .query_literal(goal)
        .results
        .iter()
        .map(|r| r.undefeated)
        .collect()
}

#[test]
fn defeasible_inference_without_attackers() {
    let mut engine = test_engine();
    birds(&mut engine);

    let outcome = engine.query_literal(p("fly", c("tweety")));
    assert_eq!(outcome.results.len(), 1);
    let result = &outcome.results[0];
    assert!(result.undefeated);
    assert_eq!(result.expression, vec![p("fly", c("tweety"))]);
    assert_eq!(result.arguments[0].strength(), 0.8);
    assert_eq!(outcome.proof.len(), 2);
    assert_eq!(outcome.proof.status(&result.arguments[0]), ArgumentStatus::Undefeated);
}

#[test]
fn stronger_rebuttal_defeats() {
    let mut engine = test_engine();
    penguins(&mut engine);

    assert_eq!(verdicts(&engine, p("fly", c("tweety"))), vec![false]);
    assert_eq!(verdicts(&engine, p("~fly", c("tweety"))), vec![true]);

    let outcome = engine.query_literal(p("fly", c("tweety")));
    let seed = &outcome.results[0].arguments[0];
    let attackers = outcome.proof.attackers(seed);
    assert_eq!(attackers.len(), 1);
    assert_eq!(attackers[0].attack.kind, AttackKind::Rebut);
    assert_eq!(attackers[0].attacker.claim(), &p("~fly", c("tweety")));
    assert_eq!(outcome.proof.len(), 4);
}

#[test]
fn duplicate_rule_is_rejected() {
    let mut engine = test_engine();
    engine.add_rule(Rule::fact(c("a")).unwrap()).unwrap();
    let before = engine.kb().len();
    let err = engine.add_rule(Rule::fact(c("a")).unwrap()).unwrap_err();
    assert!(matches!(
        err,
        AspicError::KnowledgeBase(KnowledgeBaseError::DuplicateRule { .. })
    ));
    assert_eq!(engine.kb().len(), before);
}

#[test]
fn arithmetic_folds_on_apply() {
    let sum = Term::builtin(BuiltinOp::Add, vec![Term::int(3), Term::int(4)]).unwrap();
    assert_eq!(sum.apply(&Substitution::new()), Term::int(7));

    let sum = Term::builtin(BuiltinOp::Add, vec![Term::int(3), Term::float(4.0)]).unwrap();
    assert_eq!(sum.apply(&Substitution::new()), Term::float(7.0));
}

#[test]
fn nixon_diamond_depends_on_semantics() {
    let setup = |semantics| {
        let mut engine = engine_with(ReasonerConfig {
            semantics,
            ..ReasonerConfig::default()
        });
        engine.add_rule(Rule::fact(p("quaker", c("nixon"))).unwrap()).unwrap();
        engine.add_rule(Rule::fact(p("republican", c("nixon"))).unwrap()).unwrap();
        engine.add_rule(unary_rule("pacifist", "quaker", 0.6)).unwrap();
        engine.add_rule(unary_rule("~pacifist", "republican", 0.6)).unwrap();
        engine
    };

    let grounded = setup(Semantics::Grounded);
    assert_eq!(verdicts(&grounded, p("pacifist", c("nixon"))), vec![false]);
    assert_eq!(verdicts(&grounded, p("~pacifist", c("nixon"))), vec![false]);

    let preferred = setup(Semantics::PreferredCredulous);
    assert_eq!(verdicts(&preferred, p("pacifist", c("nixon"))), vec![true]);
    assert_eq!(verdicts(&preferred, p("~pacifist", c("nixon"))), vec![true]);
}

#[test]
fn undercut_blocks_rule_application() {
    let mut engine = test_engine();
    engine.add_rule(Rule::fact(p("bird", c("tweety"))).unwrap()).unwrap();
    engine.add_rule(Rule::fact(p("penguin", c("tweety"))).unwrap()).unwrap();

    let mut scope = VarScope::new();
    let x = Term::var(scope.var("X"));
    let named = Rule::new(p("fly", x.clone()), vec![p("bird", x.clone())], 0.8)
        .unwrap()
        .with_name(p("birds_fly", x));
    engine.add_rule(named).unwrap();
    engine.add_rule(unary_rule("~birds_fly", "penguin", 0.9)).unwrap();

    let outcome = engine.query_literal(p("fly", c("tweety")));
    assert!(!outcome.results[0].undefeated);
    let seed = &outcome.results[0].arguments[0];
    let attackers = outcome.proof.attackers(seed);
    assert_eq!(attackers.len(), 1);
    assert_eq!(attackers[0].attack.kind, AttackKind::Undercut);
}

#[test]
fn transposition_exposes_contrapositive_attacks() {
    let build = |transposition| {
        let mut engine = engine_with(ReasonerConfig {
            transposition,
            ..ReasonerConfig::default()
        });
        engine.add_rule(Rule::strict(c("a"), vec![c("b")]).unwrap()).unwrap();
        engine.add_rule(Rule::new(c("b"), vec![], 0.5).unwrap()).unwrap();
        engine.add_rule(Rule::new(c("~a"), vec![], 0.9).unwrap()).unwrap();
        engine
    };

    assert_eq!(verdicts(&build(false), c("b")), vec![true]);
    assert_eq!(verdicts(&build(true), c("b")), vec![false]);
}

#[test]
fn restricted_rebutting_protects_strict_conclusions() {
    let build = |restricted_rebutting| {
        let mut engine = engine_with(ReasonerConfig {
            restricted_rebutting,
            ..ReasonerConfig::default()
        });
        engine.add_rule(Rule::strict(c("a"), vec![c("b")]).unwrap()).unwrap();
        engine.add_rule(Rule::new(c("b"), vec![], 0.5).unwrap()).unwrap();
        engine.add_rule(Rule::new(c("~a"), vec![], 0.7).unwrap()).unwrap();
        engine
    };

    assert_eq!(verdicts(&build(false), c("a")), vec![false]);
    assert_eq!(verdicts(&build(true), c("a")), vec![true]);
}

#[test]
fn valuation_changes_verdict() {
    let build = |valuation| {
        let mut engine = engine_with(ReasonerConfig {
            valuation,
            ..ReasonerConfig::default()
        });
        engine.add_rule(Rule::new(c("c"), vec![], 0.3).unwrap()).unwrap();
        engine.add_rule(Rule::new(c("b"), vec![c("c")], 0.6).unwrap()).unwrap();
        engine.add_rule(Rule::new(c("~b"), vec![], 0.5).unwrap()).unwrap();
        engine
    };

    assert_eq!(verdicts(&build(ValuationKind::WeakestLink), c("b")), vec![false]);
    assert_eq!(verdicts(&build(ValuationKind::LastLink), c("b")), vec![true]);
}

#[test]
fn removing_a_rule_restores_the_verdict() {
    let mut engine = test_engine();
    penguins(&mut engine);
    assert_eq!(verdicts(&engine, p("fly", c("tweety"))), vec![false]);

    let penguin_rule = engine
        .kb()
        .user_rules()
        .find(|r| r.consequent().functor() == Some("~fly"))
        .map(|r| r.id())
        .unwrap();
    engine.remove_rule(penguin_rule).unwrap();
    assert_eq!(verdicts(&engine, p("fly", c("tweety"))), vec![true]);
}

#[test]
fn each_query_numbers_arguments_from_one() {
    let mut engine = test_engine();
    birds(&mut engine);
    let first = engine.query_literal(p("fly", c("tweety")));
    let second = engine.query_literal(p("fly", c("tweety")));
    assert_eq!(
        first.results[0].arguments[0].id(),
        second.results[0].arguments[0].id()
    );
}

#[test]
fn rule_document_end_to_end() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("penguins.json");
    let doc = serde_json::json!({
        "rules": [
            { "head": { "functor": "bird", "args": ["tweety"] } },
            { "head": { "functor": "bird", "args": ["polly"] } },
            { "head": { "functor": "penguin", "args": ["tweety"] } },
            { "head": { "functor": "fly", "args": ["X"] },
              "body": [{ "functor": "bird", "args": ["X"] }],
              "degree": 0.8 },
            { "head": { "functor": "~fly", "args": ["X"] },
              "body": [{ "functor": "penguin", "args": ["X"] }],
              "degree": 0.9,
              "caption": "penguins do not fly" }
        ],
        "queries": [
            { "functor": "fly", "args": ["Who"] }
        ]
    });
    std::fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();

    let document = RuleDocument::load(&path).unwrap();
    let engine = Engine::from_document(ReasonerConfig::default(), &document).unwrap();
    let queries = document.queries().unwrap();
    assert_eq!(queries.len(), 1);

    let outcome = engine.query(queries[0].clone());
    let verdicts: Vec<(String, bool)> = outcome
        .results
        .iter()
        .map(|r| (r.expression[0].to_string(), r.undefeated))
        .collect();
    assert_eq!(
        verdicts,
        vec![("fly(tweety)".to_string(), false), ("fly(polly)".to_string(), true)]
    );
}

#[test]
fn config_file_drives_engine() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("reasoner.toml");
    std::fs::write(&path, "semantics = \"preferred-credulous\"\n").unwrap();
    let config = ReasonerConfig::load(&path).unwrap();

    let mut engine = engine_with(config);
    engine.add_rule(Rule::new(c("a"), vec![], 0.5).unwrap()).unwrap();
    engine.add_rule(Rule::new(c("~a"), vec![], 0.5).unwrap()).unwrap();
    assert_eq!(verdicts(&engine, c("a")), vec![true]);
}

#[test]
fn arithmetic_edges_in_rule_bodies() {
    let mut engine = test_engine();
    let mut scope = VarScope::new();
    let y = Term::var(scope.var("Y"));
    let divide = |a: i64, b: i64| Term::builtin(BuiltinOp::Divide, vec![Term::int(a), Term::int(b)]).unwrap();
    let is = |lhs: Term, rhs: Term| Term::builtin(BuiltinOp::Is, vec![lhs, rhs]).unwrap();

    engine
        .add_rule(Rule::strict(p("negated_min", y.clone()), vec![is(y.clone(), divide(i64::MIN, -1))]).unwrap())
        .unwrap();
    engine
        .add_rule(Rule::strict(p("undefined", y.clone()), vec![is(y.clone(), divide(1, 0))]).unwrap())
        .unwrap();
    let sum = Term::builtin(BuiltinOp::Add, vec![Term::int(i64::MAX), Term::int(1)]).unwrap();
    engine
        .add_rule(Rule::strict(p("past_max", y.clone()), vec![is(y, sum)]).unwrap())
        .unwrap();

    let who = || Term::var(VarScope::new().var("R"));
    let outcome = engine.query_literal(p("negated_min", who()));
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].expression, vec![p("negated_min", Term::float(-(i64::MIN as f64)))]);
    assert!(outcome.results[0].undefeated);

    assert!(engine.query_literal(p("undefined", who())).results.is_empty());

    let outcome = engine.query_literal(p("past_max", who()));
    assert_eq!(outcome.results[0].expression, vec![p("past_max", Term::float(i64::MAX as f64 + 1.0))]);
}

#[test]
fn arithmetic_over_names_is_looked_up() {
    let doc = serde_json::json!({
        "rules": [
            { "head": { "functor": "+", "args": ["left", "right"] }, "degree": 0.7 },
            { "head": { "functor": "joined", "args": ["X", "Y"] },
              "body": [{ "functor": "+", "args": ["X", "Y"] }] }
        ]
    });
    let document = RuleDocument::from_json_str(&doc.to_string()).unwrap();
    let engine = Engine::from_document(ReasonerConfig::default(), &document).unwrap();

    let outcome = engine.query_literal(Term::compound("joined", vec![c("left"), c("right")]).unwrap());
    assert_eq!(outcome.results.len(), 1);
    assert!(outcome.results[0].undefeated);
    assert_eq!(outcome.results[0].arguments[0].strength(), 0.7);

    let missing = engine.query_literal(Term::compound("joined", vec![c("left"), c("up")]).unwrap());
    assert!(missing.results.is_empty());
}

#[test]
fn shared_contrapositive_outlives_one_source() {
    let mut engine = engine_with(ReasonerConfig {
        transposition: true,
        ..ReasonerConfig::default()
    });
    let first = engine.add_rule(Rule::strict(c("c"), vec![c("a"), c("b")]).unwrap()).unwrap();
    engine.add_rule(Rule::strict(c("c"), vec![c("b"), c("a")]).unwrap()).unwrap();
    let contrapositive = Rule::strict(c("~a"), vec![c("~c"), c("b")]).unwrap();

    engine.remove_rule(first).unwrap();
    assert!(engine.kb().rule_exists(&contrapositive));

    // the contrapositive still carries an attack on `a`
    engine.add_rule(Rule::new(c("a"), vec![], 0.5).unwrap()).unwrap();
    engine.add_rule(Rule::fact(c("b")).unwrap()).unwrap();
    engine.add_rule(Rule::fact(c("~c")).unwrap()).unwrap();
    assert_eq!(verdicts(&engine, c("a")), vec![false]);
}

#[test]
fn user_copy_of_a_contrapositive_is_built_once() {
    let mut engine = engine_with(ReasonerConfig {
        transposition: true,
        ..ReasonerConfig::default()
    });
    engine.add_rule(Rule::strict(c("c"), vec![c("a")]).unwrap()).unwrap();
    engine.add_rule(Rule::strict(c("~a"), vec![c("~c")]).unwrap()).unwrap();
    engine.add_rule(Rule::fact(c("~c")).unwrap()).unwrap();

    let outcome = engine.query_literal(c("~a"));
    assert_eq!(outcome.results.len(), 1);
    assert!(outcome.results[0].undefeated);
}
