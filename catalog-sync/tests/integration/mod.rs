mod command_tests;
mod convert_tests;
