// Shared names and formatting constants

// Base class used when a class declares no superclass
pub const DEFAULT_SUPER_CLASS: &str = "java/lang/Object";

// Binary name of the only library class the language names without an import
pub const STRING_BINARY_NAME: &str = "java/lang/String";

// Name every constructor carries on the target machine
pub const INIT_METHOD: &str = "<init>";

// Receiver name inside instance methods
pub const THIS: &str = "this";

// Entry point; its single parameter is `String[] args`
pub const MAIN_METHOD: &str = "main";

// Indentation of instruction lines inside a method block
pub const INDENT: &str = "   ";

// Prefix of compiler-introduced temporaries
pub const TEMP_PREFIX: &str = "tmp";
