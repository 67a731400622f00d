//! End-to-end tests
//!
//! Each case runs a flat attribute map through reconstruction and rendering,
//! checks the emitted text against an inline snapshot and additionally
//! parses it with hcl-edit to prove the emission is well-formed HCL.

use recfg::flat_attributes::FlatAttributes;

fn rendered(resource_type: &str, name: &str, attributes: &FlatAttributes) -> String {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("RECFG_LOG"))
        .with_writer(std::io::stderr)
        .try_init();

    let resource = recfg::reconstruct::reconstruct(resource_type, name, attributes)
        .expect("well-formed state must reconstruct");
    let text = recfg::render::render(&resource);

    hcl_edit::parser::parse_body(&text).expect("rendered output must parse as HCL");

    text
}

#[test]
fn instance_with_every_shape() {
    let attributes = recfg::flat_attributes! {
        "id" => "i-abcd1234",
        "ami" => "ami-123456",
        "description" => "",
        "tags.%" => "2",
        "tags.env" => "prod",
        "tags.team" => "infra",
        "security_groups.#" => "2",
        "security_groups.3814595" => "default",
        "security_groups.570231" => "admin",
        "root_block_device.#" => "1",
        "root_block_device.X.volume_size" => "100",
    };

    // `id` and the empty description disappear; the scalar list comes out in
    // numeric index order (570231 before 3814595)
    insta::assert_snapshot!(rendered("aws_instance", "web", &attributes), @r#"
    resource "aws_instance" "web" {
        ami = "ami-123456"
        root_block_device {
            volume_size = "100"
        }
        security_groups = [
            "admin",
            "default",
        ]
        tags {
            env = "prod"
            team = "infra"
        }
    }
    "#);
}

#[test]
fn sibling_nested_blocks_get_a_blank_line() {
    let attributes = recfg::flat_attributes! {
        "ingress.#" => "2",
        "ingress.A.from_port" => "80",
        "ingress.A.protocol" => "tcp",
        "ingress.B.from_port" => "443",
        "ingress.B.protocol" => "tcp",
    };

    insta::assert_snapshot!(rendered("aws_security_group", "allow_web", &attributes), @r#"
    resource "aws_security_group" "allow_web" {
        ingress {
            from_port = "80"
            protocol = "tcp"
        }

        ingress {
            from_port = "443"
            protocol = "tcp"
        }
    }
    "#);
}

#[test]
fn three_level_nesting() {
    let attributes = recfg::flat_attributes! {
        "service.#" => "1",
        "service.X.name" => "api",
        "service.X.ports.#" => "2",
        "service.X.ports.A" => "80",
        "service.X.ports.B" => "443",
        "service.X.tags.%" => "1",
        "service.X.tags.env" => "prod",
    };

    insta::assert_snapshot!(rendered("fake_service", "api", &attributes), @r#"
    resource "fake_service" "api" {
        service {
            name = "api"
            ports = [
                "80",
                "443",
            ]
            tags {
                env = "prod"
            }
        }
    }
    "#);
}

#[test]
fn embedded_policy_document() {
    let attributes = recfg::flat_attributes! {
        "name" => "api",
        "policy" => r#"{"Version":"2012-10-17","Statement":"${var.arn}"}"#,
    };

    let text = rendered("aws_iam_policy", "api", &attributes);
    insta::assert_snapshot!(text, @r#"
    resource "aws_iam_policy" "api" {
        name = "api"
        policy = <<EOF
    {"Version":"2012-10-17","Statement":"&{var.arn}"}
    EOF
    }
    "#);
    assert!(!text.contains("${"), "interpolation syntax must be escaped");
}

#[test]
fn rendering_is_deterministic() {
    let attributes = recfg::flat_attributes! {
        "tags.%" => "1",
        "tags.env" => "prod",
        "groups.#" => "1",
        "groups.A" => "default",
    };

    let resource = recfg::reconstruct::reconstruct("aws_instance", "web", &attributes).unwrap();
    assert_eq!(recfg::render::render(&resource), recfg::render::render(&resource));
}
