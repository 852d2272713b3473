//! Signatures of the Jack OS API, which every program links against.

use phf::{phf_map, phf_set};

use super::model::{Signature, SubroutineKind};

const fn function(parameters: usize) -> Signature {
    Signature {
        kind: SubroutineKind::Function,
        parameters,
    }
}

const fn constructor(parameters: usize) -> Signature {
    Signature {
        kind: SubroutineKind::Constructor,
        parameters,
    }
}

const fn method(parameters: usize) -> Signature {
    Signature {
        kind: SubroutineKind::Method,
        parameters,
    }
}

pub static CLASSES: phf::Set<&'static str> = phf_set! {
    "Math", "String", "Array", "Output", "Screen", "Keyboard", "Memory", "Sys",
};

static SUBROUTINES: phf::Map<&'static str, Signature> = phf_map! {
    // Math
    "Math.abs" => function(1),
    "Math.multiply" => function(2),
    "Math.divide" => function(2),
    "Math.min" => function(2),
    "Math.max" => function(2),
    "Math.sqrt" => function(1),

    // String
    "String.new" => constructor(1),
    "String.dispose" => method(0),
    "String.length" => method(0),
    "String.charAt" => method(1),
    "String.setCharAt" => method(2),
    "String.appendChar" => method(1),
    "String.eraseLastChar" => method(0),
    "String.intValue" => method(0),
    "String.setInt" => method(1),
    "String.backSpace" => function(0),
    "String.doubleQuote" => function(0),
    "String.newLine" => function(0),

    // Array
    "Array.new" => function(1),
    "Array.dispose" => method(0),

    // Output
    "Output.moveCursor" => function(2),
    "Output.printChar" => function(1),
    "Output.printString" => function(1),
    "Output.printInt" => function(1),
    "Output.println" => function(0),
    "Output.backSpace" => function(0),

    // Screen
    "Screen.clearScreen" => function(0),
    "Screen.setColor" => function(1),
    "Screen.drawPixel" => function(2),
    "Screen.drawLine" => function(4),
    "Screen.drawRectangle" => function(4),
    "Screen.drawCircle" => function(3),

    // Keyboard
    "Keyboard.keyPressed" => function(0),
    "Keyboard.readChar" => function(0),
    "Keyboard.readLine" => function(1),
    "Keyboard.readInt" => function(1),

    // Memory
    "Memory.peek" => function(1),
    "Memory.poke" => function(2),
    "Memory.alloc" => function(1),
    "Memory.deAlloc" => function(1),

    // Sys
    "Sys.halt" => function(0),
    "Sys.error" => function(1),
    "Sys.wait" => function(1),
};

pub fn is_os_class(name: &str) -> bool {
    CLASSES.contains(name)
}

pub fn subroutine(class_name: &str, subroutine_name: &str) -> Option<Signature> {
    SUBROUTINES
        .get(format!("{class_name}.{subroutine_name}").as_str())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(
            subroutine("Math", "multiply"),
            Some(Signature {
                kind: SubroutineKind::Function,
                parameters: 2
            })
        );
        assert!(subroutine("String", "appendChar")
            .is_some_and(|signature| signature.kind == SubroutineKind::Method));
        assert_eq!(subroutine("Math", "pow"), None);
    }

    #[test]
    fn test_every_subroutine_belongs_to_an_os_class() {
        assert!(SUBROUTINES.keys().all(|name| name
            .split_once('.')
            .is_some_and(|(class_name, _)| is_os_class(class_name))));
    }
}
