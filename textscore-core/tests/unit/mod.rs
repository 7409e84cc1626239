mod http_router_tests;
