mod trigger_tree_test;
