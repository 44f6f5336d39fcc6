pub mod node_tests;
