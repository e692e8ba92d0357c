//! Application sink: pushes a resolved theme into the render surface
//!
//! For each of `primary` and `accent` the sink writes the five shade
//! variables (`--primary`, `--primary-dark`, `--primary-lighter`,
//! `--primary-hover`, `--primary-active`, and the same for `accent`) plus
//! `--background`, sets the root dark flag, and then invalidates the
//! surface so cached computed styles are dropped before the next paint.

use crate::theme::EffectiveTheme;
use crate::tokens::{ShadeSet, ShadeVariant};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Style variable name -> value
pub type StyleVariables = BTreeMap<String, String>;

/// A live render surface that accepts style variables
pub trait RenderTarget {
    /// Write (or overwrite) style variables on the root node
    fn apply_variables(&mut self, variables: &StyleVariables);

    /// Toggle the root dark/light flag
    fn set_dark_flag(&mut self, dark: bool);

    /// Force an immediate restyle, e.g. by a transient no-op mutation of the
    /// render tree, so the new palette shows within one paint cycle
    fn invalidate(&mut self);
}

impl<T: RenderTarget + ?Sized> RenderTarget for Box<T> {
    fn apply_variables(&mut self, variables: &StyleVariables) {
        (**self).apply_variables(variables)
    }

    fn set_dark_flag(&mut self, dark: bool) {
        (**self).set_dark_flag(dark)
    }

    fn invalidate(&mut self) {
        (**self).invalidate()
    }
}

/// Compute the full variable set for a theme
pub fn style_variables(theme: &EffectiveTheme) -> StyleVariables {
    let colors = theme.colors();
    let mut vars = StyleVariables::new();

    for (role, base) in [
        ("primary", colors.primary_color),
        ("accent", colors.accent_color),
    ] {
        let shades = ShadeSet::derive(base);
        for &variant in ShadeVariant::all() {
            let name = match variant.suffix() {
                Some(suffix) => format!("--{role}-{suffix}"),
                None => format!("--{role}"),
            };
            vars.insert(name, shades.get(variant).to_string());
        }
    }
    vars.insert("--background".into(), colors.background_color.to_string());

    vars
}

/// Writes resolved themes into a [`RenderTarget`]
pub struct ApplicationSink {
    target: Box<dyn RenderTarget>,
    applied: u64,
}

impl ApplicationSink {
    pub fn new(target: impl RenderTarget + 'static) -> Self {
        Self {
            target: Box::new(target),
            applied: 0,
        }
    }

    /// Variables first, then the dark flag, then invalidation
    pub fn apply(&mut self, theme: &EffectiveTheme) {
        let vars = style_variables(theme);
        tracing::trace!(
            mode = %theme.mode(),
            is_dark = theme.is_dark(),
            variables = vars.len(),
            "sink: applying theme"
        );

        self.target.apply_variables(&vars);
        self.target.set_dark_flag(theme.is_dark());
        self.target.invalidate();
        self.applied += 1;
    }

    /// How many times a theme has been applied
    pub fn applied_count(&self) -> u64 {
        self.applied
    }
}

impl fmt::Debug for ApplicationSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationSink")
            .field("applied", &self.applied)
            .finish_non_exhaustive()
    }
}

/// One call made against a [`RecordingTarget`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SinkOp {
    Variables(usize),
    DarkFlag(bool),
    Invalidate,
}

#[derive(Debug, Default)]
struct Recorded {
    variables: StyleVariables,
    dark: bool,
    ops: Vec<SinkOp>,
}

/// In-memory render target that records every call; clones share state
#[derive(Clone, Debug, Default)]
pub struct RecordingTarget {
    state: Rc<RefCell<Recorded>>,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a style variable
    pub fn variable(&self, name: &str) -> Option<String> {
        self.state.borrow().variables.get(name).cloned()
    }

    pub fn variables(&self) -> StyleVariables {
        self.state.borrow().variables.clone()
    }

    pub fn is_dark(&self) -> bool {
        self.state.borrow().dark
    }

    pub fn ops(&self) -> Vec<SinkOp> {
        self.state.borrow().ops.clone()
    }

    /// Number of completed applications (one invalidation each)
    pub fn applications(&self) -> usize {
        self.state
            .borrow()
            .ops
            .iter()
            .filter(|op| **op == SinkOp::Invalidate)
            .count()
    }
}

impl RenderTarget for RecordingTarget {
    fn apply_variables(&mut self, variables: &StyleVariables) {
        let mut state = self.state.borrow_mut();
        state
            .variables
            .extend(variables.iter().map(|(k, v)| (k.clone(), v.clone())));
        state.ops.push(SinkOp::Variables(variables.len()));
    }

    fn set_dark_flag(&mut self, dark: bool) {
        let mut state = self.state.borrow_mut();
        state.dark = dark;
        state.ops.push(SinkOp::DarkFlag(dark));
    }

    fn invalidate(&mut self) {
        self.state.borrow_mut().ops.push(SinkOp::Invalidate);
    }
}
