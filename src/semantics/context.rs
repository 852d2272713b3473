use std::{
    collections::{HashMap, HashSet},
    str::FromStr,
};

use super::{
    error::CompilerError,
    model::{Primitive, Signature, VariableType},
    os,
};

// region: Location

/// Where an error is reported from.
#[derive(Debug, Clone)]
pub struct Location {
    pub class_name: String,
    pub subroutine_name: Option<String>,
}

impl Location {
    pub fn class<S: Into<String>>(class_name: S) -> Self {
        Self {
            class_name: class_name.into(),
            subroutine_name: None,
        }
    }

    pub fn subroutine<S: Into<String>>(&self, subroutine_name: S) -> Self {
        Self {
            class_name: self.class_name.clone(),
            subroutine_name: Some(subroutine_name.into()),
        }
    }
}

// endregion

// region: ProgramContext

/// Outcome of looking up the subroutine a call refers to.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Lookup {
    Known(Signature),
    /// The class is known, but declares no such subroutine.
    UnknownSubroutine,
    /// Neither a program nor an OS class; left for the VM to link.
    External,
}

/// Whole-program state shared by all analysis passes.
#[derive(Debug)]
pub struct ProgramContext {
    /// Names of every class usable as a type.
    types: HashSet<String>,
    /// Subroutine signatures of the program's classes (first declaration wins).
    signatures: HashMap<String, HashMap<String, Signature>>,
    pub errors: Vec<CompilerError>,
}

impl ProgramContext {
    pub fn new() -> Self {
        Self {
            types: os::CLASSES.iter().map(ToString::to_string).collect(),
            signatures: HashMap::new(),
            errors: Vec::new(),
        }
    }

    pub fn report<S: Into<String>>(&mut self, location: &Location, line: usize, message: S) {
        let error = CompilerError {
            class_name: location.class_name.clone(),
            subroutine_name: location.subroutine_name.clone(),
            line,
            message: message.into(),
        };

        log::debug!("semantic error: {error}");
        self.errors.push(error);
    }

    /// Register a program class, making its name a valid type.
    ///
    /// Returns `false` (and reports) if the name is already taken,
    /// in which case the class stays unlinked: its signatures are never visible to callers.
    pub fn register_class(&mut self, name: &str, line: usize) -> bool {
        if self.types.contains(name) {
            self.report(
                &Location::class(name),
                line,
                format!("class `{name}` is already declared"),
            );
            return false;
        }

        self.types.insert(name.to_string());
        self.signatures.insert(name.to_string(), HashMap::new());

        true
    }

    pub fn is_class(&self, name: &str) -> bool {
        self.types.contains(name)
    }

    pub fn resolve_type(&self, name: &str) -> Option<VariableType> {
        if let Ok(primitive) = Primitive::from_str(name) {
            return Some(VariableType::Primitive(primitive));
        }

        self.is_class(name)
            .then(|| VariableType::Class(name.to_string()))
    }

    pub fn add_signature(&mut self, class_name: &str, subroutine_name: &str, signature: Signature) {
        if let Some(signatures) = self.signatures.get_mut(class_name) {
            signatures
                .entry(subroutine_name.to_string())
                .or_insert(signature);
        }
    }

    pub fn lookup(&self, class_name: &str, subroutine_name: &str) -> Lookup {
        if let Some(signatures) = self.signatures.get(class_name) {
            return signatures
                .get(subroutine_name)
                .copied()
                .map_or(Lookup::UnknownSubroutine, Lookup::Known);
        }

        if os::is_os_class(class_name) {
            return os::subroutine(class_name, subroutine_name)
                .map_or(Lookup::UnknownSubroutine, Lookup::Known);
        }

        Lookup::External
    }
}

// endregion

// region: ScopeChain

/// Names declared in the enclosing class and subroutine,
/// used to detect collisions (program-level names live in [`ProgramContext`]).
#[derive(Debug, Default)]
pub struct ScopeChain {
    frames: Vec<HashSet<String>>,
}

impl ScopeChain {
    pub fn enter(&mut self) {
        self.frames.push(HashSet::new());
    }

    pub fn leave(&mut self) {
        self.frames.pop();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.frames.iter().any(|frame| frame.contains(name))
    }

    /// Add a name to the innermost frame.
    /// Returns `false` if it was already taken anywhere in the chain.
    pub fn declare(&mut self, name: &str) -> bool {
        let is_free = !self.contains(name);

        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string());
        }

        is_free
    }
}

// endregion
