pub const API_KEY_USER: &str = r#"
mutation GetSpaceliftToken($keyId: ID!, $keySecret: String!) {
    apiKeyUser(id: $keyId, secret: $keySecret) {
        id
        jwt
    }
}
"#;

pub const LIST_STACKS: &str = r#"
query {
    stacks {
        id
        name
        administrative
        branch
        namespace
        provider
        repository
        repositoryURL
        projectRoot
        space
        labels
        description
        terraformVersion
        workerPool {
            id
            space
        }
        vcsIntegration {
            id
        }
        vendorConfig {
            __typename
        }
    }
}
"#;

pub const UPDATE_STACK: &str = r#"
mutation UpdateStack($stackId: ID!, $input: StackInput!) {
    stackUpdate(id: $stackId, input: $input) {
        id
        __typename
    }
}
"#;
