//! Lazy argument construction.
//!
//! [`ArgumentBuilder::arguments`] returns a pull-based stream of every
//! argument whose claim unifies with a literal. Two state machines do the
//! work:
//!
//! - `LiteralArguments` walks the candidate rules of one goal, unifies each
//!   renamed-apart consequent and expands the antecedent
//! - `ArgumentLists` enumerates the cross product of arguments for an
//!   antecedent `[e1, ..., en]` as `lists([e1..e(n-1)]) x args(en)`, applying
//!   the substitution of each prefix before asking for the next literal
//!
//! At any time only one partial list and one tail iterator per antecedent
//! position are alive. A goal that is a variant of one of its ancestors is
//! not expanded again, and expansion stops at the configured depth.

use std::iter::Peekable;
use std::rc::Rc;
use std::sync::Arc;

use crate::kb::KnowledgeBase;
use crate::rule::Rule;
use crate::substitution::Substitution;
use crate::term::builtin::Evaluation;
use crate::term::{BuiltinOp, Term};

use super::valuation::{Valuation, ValuationKind};
use super::{Argument, ArgumentIds, ArgumentList};

/// Default bound on argument nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Builds arguments against one knowledge base for one reasoning session.
#[derive(Debug)]
pub struct ArgumentBuilder<'kb> {
    kb: &'kb KnowledgeBase,
    valuation: ValuationKind,
    ids: ArgumentIds,
    max_depth: usize,
}

impl<'kb> ArgumentBuilder<'kb> {
    pub fn new(kb: &'kb KnowledgeBase, valuation: ValuationKind) -> Self {
        Self {
            kb,
            valuation,
            ids: ArgumentIds::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn knowledge_base(&self) -> &'kb KnowledgeBase {
        self.kb
    }

    pub fn valuation(&self) -> ValuationKind {
        self.valuation
    }

    pub fn ids(&self) -> &ArgumentIds {
        &self.ids
    }

    /// Every main argument for `literal` with strength at least
    /// `min_strength`. Each call yields a fresh stream.
    pub fn arguments(&self, literal: &Term, min_strength: f64) -> ArgumentStream<'_> {
        self.arguments_under(literal, &Substitution::new(), min_strength)
    }

    /// Like [`arguments`](Self::arguments), starting from existing bindings.
    pub fn arguments_under(
        &self,
        literal: &Term,
        subs: &Substitution,
        min_strength: f64,
    ) -> ArgumentStream<'_> {
        ArgumentStream {
            inner: LiteralArguments::new(self, literal.clone(), subs.clone(), Context::root(min_strength))
                .peekable(),
        }
    }

    /// Every way of supporting all of `literals` at once, one main argument
    /// per literal.
    pub fn argument_lists(&self, literals: &[Term], min_strength: f64) -> ArgumentListStream<'_> {
        ArgumentListStream {
            inner: ArgumentLists::new(
                self,
                literals.to_vec(),
                Substitution::new(),
                Context::root(min_strength),
            )
            .peekable(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public streams
// ---------------------------------------------------------------------------

/// Lazy sequence of arguments with one element of look-ahead.
pub struct ArgumentStream<'a> {
    inner: Peekable<LiteralArguments<'a>>,
}

impl ArgumentStream<'_> {
    /// Whether another argument follows, without consuming it.
    pub fn has_more(&mut self) -> bool {
        self.inner.peek().is_some()
    }

    pub fn peek(&mut self) -> Option<&Arc<Argument>> {
        self.inner.peek()
    }
}

impl Iterator for ArgumentStream<'_> {
    type Item = Arc<Argument>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Lazy sequence of argument lists for a conjunction.
pub struct ArgumentListStream<'a> {
    inner: Peekable<ArgumentLists<'a>>,
}

impl ArgumentListStream<'_> {
    pub fn has_more(&mut self) -> bool {
        self.inner.peek().is_some()
    }
}

impl Iterator for ArgumentListStream<'_> {
    type Item = ArgumentList;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

// ---------------------------------------------------------------------------
// Goal context
// ---------------------------------------------------------------------------

struct Frame {
    goal: Term,
    parent: Option<Rc<Frame>>,
}

#[derive(Clone)]
struct Context {
    min_strength: f64,
    depth: usize,
    ancestors: Option<Rc<Frame>>,
}

impl Context {
    fn root(min_strength: f64) -> Self {
        Self {
            min_strength,
            depth: 0,
            ancestors: None,
        }
    }

    fn child(&self, goal: &Term, min_strength: f64) -> Self {
        Self {
            min_strength,
            depth: self.depth + 1,
            ancestors: Some(Rc::new(Frame {
                goal: goal.clone(),
                parent: self.ancestors.clone(),
            })),
        }
    }

    fn is_looping(&self, goal: &Term) -> bool {
        let mut frame = self.ancestors.as_deref();
        while let Some(f) = frame {
            if f.goal.is_equal_modulo_variables(goal) {
                return true;
            }
            frame = f.parent.as_deref();
        }
        false
    }
}

// ---------------------------------------------------------------------------
// Arguments for one literal
// ---------------------------------------------------------------------------

enum LiteralState<'a> {
    Start,
    Searching,
    Expanding {
        rule: Arc<Rule>,
        lists: Box<ArgumentLists<'a>>,
    },
    Done,
}

struct LiteralArguments<'a> {
    builder: &'a ArgumentBuilder<'a>,
    goal: Term,
    subs: Substitution,
    ctx: Context,
    candidates: std::vec::IntoIter<Arc<Rule>>,
    state: LiteralState<'a>,
}

impl<'a> LiteralArguments<'a> {
    fn new(builder: &'a ArgumentBuilder<'a>, literal: Term, subs: Substitution, ctx: Context) -> Self {
        Self {
            builder,
            goal: literal.apply(&subs),
            subs,
            ctx,
            candidates: Vec::new().into_iter(),
            state: LiteralState::Start,
        }
    }

    /// Solve single-shot goals directly, or prepare rule lookup.
    fn start(&mut self) -> Option<Arc<Argument>> {
        match &self.goal {
            Term::Number(_) => Some(self.evaluated(self.subs.clone())),
            Term::Variable(_) => None,
            Term::Builtin(BuiltinOp::NotProvable, args) => {
                let [inner] = args.as_ref() else {
                    return None;
                };
                let mut attempt = LiteralArguments::new(
                    self.builder,
                    inner.clone(),
                    self.subs.clone(),
                    self.ctx.child(&self.goal, 0.0),
                );
                if attempt.next().is_none() {
                    Some(self.evaluated(self.subs.clone()))
                } else {
                    None
                }
            }
            Term::Builtin(op, args) => match op.evaluate(args, &self.subs) {
                Evaluation::Succeeded(subs) => Some(self.evaluated(subs)),
                Evaluation::Failed => None,
                Evaluation::Lookup => {
                    let literal = self.goal.arithmetic_literal()?;
                    tracing::trace!(goal = %self.goal, "non-numeric operands, looking up rules");
                    self.goal = literal;
                    self.search();
                    None
                }
            },
            Term::Constant(_) | Term::Compound(..) => {
                self.search();
                None
            }
        }
    }

    /// Prepare rule lookup for a constant or compound goal.
    fn search(&mut self) {
        if self.ctx.depth > self.builder.max_depth {
            tracing::trace!(goal = %self.goal, depth = self.ctx.depth, "depth limit reached");
            return;
        }
        if self.ctx.is_looping(&self.goal) {
            tracing::trace!(goal = %self.goal, "goal repeats an ancestor, not expanded");
            return;
        }
        self.candidates = self.builder.kb.candidates(&self.goal).into_iter();
        self.state = LiteralState::Searching;
    }

    fn evaluated(&self, subs: Substitution) -> Arc<Argument> {
        let rule = Arc::new(Rule::evaluated(self.goal.clone()));
        Arc::new(Argument::new(
            self.builder.ids.next_id(),
            rule,
            subs,
            Vec::new(),
            1.0,
            self.ctx.depth,
        ))
    }

    /// Unify a renamed-apart copy of `rule` with the goal and prepare its
    /// antecedent.
    fn expand(&self, rule: &Rule) -> Option<(Arc<Rule>, ArgumentLists<'a>)> {
        if rule.degree() < self.ctx.min_strength {
            return None;
        }
        let instance = rule.rename_apart();
        let unified = instance.consequent().unify(&self.goal, &self.subs);
        if !unified.is_consistent() {
            return None;
        }
        tracing::trace!(goal = %self.goal, rule = %rule, "expanding rule");

        let sub_min = if self.builder.valuation.prunes_sub_goals() {
            self.ctx.min_strength
        } else {
            0.0
        };
        let lists = ArgumentLists::new(
            self.builder,
            instance.antecedent().to_vec(),
            unified,
            self.ctx.child(&self.goal, sub_min),
        );
        Some((Arc::new(instance), lists))
    }

    fn conclude(&self, rule: &Arc<Rule>, list: ArgumentList) -> Option<Arc<Argument>> {
        let strength = self.builder.valuation.strength(rule, &list.arguments);
        if strength < self.ctx.min_strength {
            return None;
        }
        Some(Arc::new(Argument::new(
            self.builder.ids.next_id(),
            Arc::clone(rule),
            list.substitution,
            list.arguments,
            strength,
            self.ctx.depth,
        )))
    }
}

impl Iterator for LiteralArguments<'_> {
    type Item = Arc<Argument>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.state, LiteralState::Done) {
                LiteralState::Start => {
                    if let Some(argument) = self.start() {
                        return Some(argument);
                    }
                    if matches!(self.state, LiteralState::Done) {
                        return None;
                    }
                }
                LiteralState::Searching => {
                    let rule = self.candidates.next()?;
                    self.state = match self.expand(&rule) {
                        Some((rule, lists)) => LiteralState::Expanding {
                            rule,
                            lists: Box::new(lists),
                        },
                        None => LiteralState::Searching,
                    };
                }
                LiteralState::Expanding { rule, mut lists } => match lists.next() {
                    Some(list) => {
                        let argument = self.conclude(&rule, list);
                        self.state = LiteralState::Expanding { rule, lists };
                        if argument.is_some() {
                            return argument;
                        }
                    }
                    None => self.state = LiteralState::Searching,
                },
                LiteralState::Done => return None,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Argument lists for an antecedent
// ---------------------------------------------------------------------------

enum Lists<'a> {
    /// The single empty list, until yielded.
    Empty(Option<Substitution>),
    Cons {
        head: Box<ArgumentLists<'a>>,
        last: Term,
        builder: &'a ArgumentBuilder<'a>,
        ctx: Context,
        current: Option<(ArgumentList, LiteralArguments<'a>)>,
    },
}

struct ArgumentLists<'a> {
    inner: Lists<'a>,
}

impl<'a> ArgumentLists<'a> {
    fn new(
        builder: &'a ArgumentBuilder<'a>,
        mut literals: Vec<Term>,
        subs: Substitution,
        ctx: Context,
    ) -> Self {
        let inner = match literals.pop() {
            None => Lists::Empty(Some(subs)),
            Some(last) => Lists::Cons {
                head: Box::new(Self::new(builder, literals, subs, ctx.clone())),
                last,
                builder,
                ctx,
                current: None,
            },
        };
        Self { inner }
    }
}

impl Iterator for ArgumentLists<'_> {
    type Item = ArgumentList;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            Lists::Empty(subs) => subs.take().map(ArgumentList::empty),
            Lists::Cons {
                head,
                last,
                builder,
                ctx,
                current,
            } => loop {
                if let Some((prefix, tails)) = current {
                    if let Some(argument) = tails.next() {
                        let mut list = prefix.clone();
                        list.push(argument);
                        return Some(list);
                    }
                }
                let prefix = head.next()?;
                let tails = LiteralArguments::new(
                    *builder,
                    last.clone(),
                    prefix.substitution.clone(),
                    ctx.clone(),
                );
                *current = Some((prefix, tails));
            },
        }
    }
}
