mod combine_tests;
mod control_tests;
mod helpers;
mod variable_tests;
