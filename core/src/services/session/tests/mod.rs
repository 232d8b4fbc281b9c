mod fingerprint_tests;
