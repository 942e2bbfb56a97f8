//! Shared test fixtures.
//!
//! Hand-built ink! metadata documents mirroring the shape produced by the
//! contract build pipeline, small enough to reason about in tests. All
//! fixtures share one portable type registry; selectors are stable so tests
//! can assert on encoded call data.

use serde_json::{json, Value};

/// Portable type registry used by every fixture. Ids are referenced from the
/// message specs below.
fn types() -> Value {
    json!([
        { "id": 0, "type": { "def": { "primitive": "u8" } } },
        { "id": 1, "type": { "def": { "array": { "len": 32, "type": 0 } } } },
        {
            "id": 2,
            "type": {
                "path": ["ink_primitives", "types", "AccountId"],
                "def": { "composite": { "fields": [{ "type": 1, "typeName": "[u8; 32]" }] } }
            }
        },
        { "id": 3, "type": { "def": { "primitive": "u64" } } },
        { "id": 4, "type": { "def": { "primitive": "u128" } } },
        {
            "id": 5,
            "type": {
                "path": ["registry", "Agent"],
                "def": {
                    "composite": {
                        "fields": [
                            { "name": "address", "type": 2, "typeName": "AccountId" },
                            { "name": "weight", "type": 3, "typeName": "u64" }
                        ]
                    }
                }
            }
        },
        { "id": 6, "type": { "def": { "sequence": { "type": 5 } } } },
        { "id": 7, "type": { "def": { "tuple": [3, 6] } } },
        {
            "id": 8,
            "type": {
                "path": ["registry", "RegistryError"],
                "def": {
                    "variant": {
                        "variants": [
                            { "name": "InvalidInput", "fields": [], "index": 0 },
                            { "name": "ActiveAgent", "fields": [], "index": 1 }
                        ]
                    }
                }
            }
        },
        {
            "id": 9,
            "type": {
                "def": {
                    "variant": {
                        "variants": [
                            { "name": "Ok", "fields": [{ "type": 7 }], "index": 0 },
                            { "name": "Err", "fields": [{ "type": 8 }], "index": 1 }
                        ]
                    }
                }
            }
        },
        {
            "id": 10,
            "type": {
                "path": ["ink_primitives", "LangError"],
                "def": {
                    "variant": {
                        "variants": [{ "name": "CouldNotReadInput", "fields": [], "index": 1 }]
                    }
                }
            }
        },
        {
            "id": 11,
            "type": {
                "def": {
                    "variant": {
                        "variants": [
                            { "name": "Ok", "fields": [{ "type": 9 }], "index": 0 },
                            { "name": "Err", "fields": [{ "type": 10 }], "index": 1 }
                        ]
                    }
                }
            }
        },
        {
            "id": 12,
            "type": {
                "def": {
                    "variant": {
                        "variants": [
                            { "name": "Ok", "fields": [{ "type": 2 }], "index": 0 },
                            { "name": "Err", "fields": [{ "type": 10 }], "index": 1 }
                        ]
                    }
                }
            }
        },
        { "id": 13, "type": { "def": { "tuple": [] } } },
        {
            "id": 14,
            "type": {
                "def": {
                    "variant": {
                        "variants": [
                            { "name": "Ok", "fields": [{ "type": 13 }], "index": 0 },
                            { "name": "Err", "fields": [{ "type": 8 }], "index": 1 }
                        ]
                    }
                }
            }
        },
        {
            "id": 15,
            "type": {
                "def": {
                    "variant": {
                        "variants": [
                            { "name": "Ok", "fields": [{ "type": 14 }], "index": 0 },
                            { "name": "Err", "fields": [{ "type": 10 }], "index": 1 }
                        ]
                    }
                }
            }
        },
        { "id": 16, "type": { "def": { "primitive": "u32" } } },
        { "id": 17, "type": { "def": { "sequence": { "type": 2 } } } },
        { "id": 18, "type": { "def": { "sequence": { "type": 3 } } } },
        { "id": 19, "type": { "def": { "primitive": "str" } } },
        {
            "id": 20,
            "type": {
                "def": {
                    "variant": {
                        "variants": [
                            { "name": "None", "fields": [], "index": 0 },
                            { "name": "Some", "fields": [{ "type": 19 }], "index": 1 }
                        ]
                    }
                }
            }
        },
        {
            "id": 21,
            "type": {
                "path": ["ink_primitives", "types", "Hash"],
                "def": { "composite": { "fields": [{ "type": 1, "typeName": "[u8; 32]" }] } }
            }
        }
    ])
}

fn document(
    name: &str,
    hash_byte: u8,
    wasm: &str,
    constructors: Value,
    messages: Value,
) -> Value {
    let hash = format!("0x{}", hex_repeat(hash_byte));
    json!({
        "source": { "hash": hash, "wasm": wasm },
        "contract": { "name": name, "version": "0.1.0" },
        "spec": { "constructors": constructors, "messages": messages },
        "types": types(),
        "version": "4"
    })
}

fn hex_repeat(byte: u8) -> String {
    format!("{byte:02x}").repeat(32)
}

/// Registry contract: agent management messages.
pub fn registry_metadata() -> Value {
    document(
        "registry",
        0x11,
        "0x0061736d0100000001",
        json!([
            { "label": "new", "selector": "0x9bae9d5e", "returnType": null }
        ]),
        json!([
            { "label": "add_agent", "selector": "0x00000001", "returnType": { "type": 15 } },
            { "label": "update_agents", "selector": "0x00000002", "returnType": { "type": 15 } },
            { "label": "remove_agent", "selector": "0x00000003", "returnType": { "type": 15 } },
            { "label": "get_agents", "selector": "0x00000004", "returnType": { "type": 11 } },
            { "label": "initialize_agent", "selector": "0x00000005", "returnType": { "type": 15 } }
        ]),
    )
}

/// Share token: only the constructor matters to the deployment flow.
pub fn share_token_metadata() -> Value {
    document(
        "share_token",
        0x22,
        "0x0061736d0100000002",
        json!([
            { "label": "new", "selector": "0x9bae9d5e", "returnType": null }
        ]),
        json!([]),
    )
}

/// Nomination agent: deployed as a code template, never called directly.
pub fn nomination_agent_metadata() -> Value {
    document(
        "nomination_agent",
        0x33,
        "0x0061736d0100000003",
        json!([
            { "label": "new", "selector": "0x9bae9d5e", "returnType": null }
        ]),
        json!([]),
    )
}

/// Vault: production and fast-unlock constructors plus the address getters.
pub fn vault_metadata() -> Value {
    document(
        "vault",
        0x44,
        "0x0061736d0100000004",
        json!([
            { "label": "new", "selector": "0x9bae9d5e", "returnType": null },
            { "label": "custom_era", "selector": "0xd002a6c3", "returnType": null }
        ]),
        json!([
            {
                "label": "IVault::get_registry_contract",
                "selector": "0x00a10001",
                "returnType": { "type": 12 }
            },
            {
                "label": "IVault::get_share_token_contract",
                "selector": "0x00a10002",
                "returnType": { "type": 12 }
            }
        ]),
    )
}
