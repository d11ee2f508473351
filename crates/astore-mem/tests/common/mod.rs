// Shared fixtures for the astore-mem integration tests.

#![allow(dead_code)]

use astore_mem::{Config, Session};

pub const SCHED: &str = "/usr/include/x86_64-linux-gnu/bits/sched.h";

/// Type names and paths as a clang AST dump repeats them: 34 tokens, 15
/// distinct.
pub fn dump_tokens() -> Vec<&'static str> {
    let mut tokens = vec!["data"; 7];
    tokens.push("FILE *restrict");
    tokens.extend([SCHED; 5]);
    tokens.push("const struct rlimit64 *");
    tokens.extend([SCHED; 2]);
    tokens.push("__timeout");
    tokens.push("int (*)(const char *restrict, struct stat *restrict)");
    tokens.extend([SCHED; 3]);
    tokens.extend([
        "sigsuspend",
        "__xstat64",
        "cmsghdr",
        "int (int, struct mmsghdr *, unsigned int, int)",
        "void *(*volatile)(size_t, size_t, const void *)",
        "epoll_data_t",
        "epoll_data_t",
        "u_char *(ngx_pool_t *, ngx_str_t *)",
        "ngx_shm_t *",
        "ngx_shm_t *",
        "void (ngx_err_t, const char *, ...)",
        "void (ngx_err_t, const char *, ...)",
        "data",
    ]);
    tokens
}

/// `count` distinct identifiers, long enough to exercise both inline and
/// heap strings.
pub fn identifiers(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            if i % 3 == 0 {
                format!("ngx_http_module_ctx_{i}_with_a_long_suffix")
            } else {
                format!("ident_{i}")
            }
        })
        .collect()
}

/// A session whose string table has `size` slots.
pub fn session<N>(size: usize) -> Session<N> {
    Session::new(&Config::default().with_string_set_size(size))
}
