//! Built-in lab setup survey.

use intake_domain::SectionId;

use crate::schema::{DynamicItems, FieldDescriptor, FieldKind, SectionSchema, SurveySchema};

pub const CONTACT: &str = "contact";
pub const COURSE: &str = "course";
pub const HARDWARE: &str = "hardware";
pub const LAB: &str = "lab";
pub const LAB_COUNT: &str = "lab_count";

const MAX_LABS: i64 = 25;

/// Contact, course, one page per lab, hardware, then review.
pub fn lab_survey() -> SurveySchema {
    SurveySchema {
        name: "Lab Setup Survey",
        sections: vec![contact_section(), course_section(), hardware_section()],
        dynamic: Some(DynamicItems {
            section: SectionId::from(COURSE),
            field: LAB_COUNT,
            after: SectionId::from(COURSE),
            template: lab_section(),
        }),
    }
}

fn other_text(key: &'static str, label: &'static str) -> FieldDescriptor {
    FieldDescriptor::new(key, label, FieldKind::Text).with_optional()
}

fn system_count(key: &'static str, label: &'static str) -> FieldDescriptor {
    FieldDescriptor::new(key, label, FieldKind::integer(Some(0), None)).with_optional()
}

fn contact_section() -> SectionSchema {
    SectionSchema::new(
        CONTACT,
        "Contact Information",
        vec![
            FieldDescriptor::new("name", "Full Name", FieldKind::Text),
            FieldDescriptor::new("email", "Email Address", FieldKind::Text),
            FieldDescriptor::new("organization", "Organization", FieldKind::Text),
            FieldDescriptor::new(
                "org_type",
                "Organization Type",
                FieldKind::choice(&[
                    "University/College",
                    "Corporate",
                    "Government",
                    "Non-Profit",
                    "Other",
                ])
                .with_other("Other", "org_type_other"),
            ),
            other_text("org_type_other", "Organization Type (other)"),
        ],
    )
}

fn course_section() -> SectionSchema {
    SectionSchema::new(
        COURSE,
        "Course Details",
        vec![
            FieldDescriptor::new("course_name", "Course Name", FieldKind::Text),
            FieldDescriptor::new(
                "delivery_format",
                "Delivery Format",
                FieldKind::choice(&["Instructor-Led", "Self-Paced", "Blended", "Other"])
                    .with_other("Other", "delivery_format_other"),
            ),
            other_text("delivery_format_other", "Delivery Format (other)"),
            FieldDescriptor::new(
                LAB_COUNT,
                "Number of Labs",
                FieldKind::integer(Some(1), Some(MAX_LABS)),
            )
            .with_help("One lab page is collected per lab."),
            FieldDescriptor::new("target_date", "Target Completion Date", FieldKind::Date)
                .with_optional()
                .with_help("Use YYYY-MM-DD."),
        ],
    )
}

fn lab_section() -> SectionSchema {
    SectionSchema::new(
        LAB,
        "Lab Request Details",
        vec![
            FieldDescriptor::new("lab_name", "Lab Name", FieldKind::Text),
            FieldDescriptor::new(
                "lab_type",
                "Lab Type",
                FieldKind::choice(&["Instructional", "Self-Paced", "Assessment", "Other"])
                    .with_other("Other", "lab_type_other"),
            ),
            other_text("lab_type_other", "Lab Type (other)"),
            FieldDescriptor::new(
                "persistence",
                "Persistence",
                FieldKind::choice(&["Persistent", "Non-Persistent"]),
            )
            .with_help("Persistent saves work between sessions, Non-Persistent resets each time."),
            FieldDescriptor::new(
                "duration",
                "Duration",
                FieldKind::choice(&["1 hour", "4 hours", "1 day", "1 week", "Custom"])
                    .with_other("Custom", "duration_custom"),
            ),
            other_text("duration_custom", "Duration (custom)"),
            FieldDescriptor::new(
                "learning_objectives",
                "Learning Objectives",
                FieldKind::multi_choice(&[
                    "Certification",
                    "Hands-On",
                    "Assessment",
                    "Workshop",
                    "Other",
                ])
                .with_other("Other", "learning_objectives_other"),
            )
            .with_optional(),
            other_text("learning_objectives_other", "Learning Objectives (other)"),
            FieldDescriptor::new(
                "complexity",
                "Complexity",
                FieldKind::choice(&["Beginner", "Intermediate", "Advanced"]),
            ),
            FieldDescriptor::new(
                "developer",
                "Developer",
                FieldKind::choice(&["ACI", "Customer SME", "Joint"]),
            ),
            FieldDescriptor::new(
                "vm_count",
                "Virtual Machines",
                FieldKind::integer(Some(1), Some(50)),
            ),
        ],
    )
}

fn hardware_section() -> SectionSchema {
    SectionSchema::new(
        HARDWARE,
        "Hardware Requirements",
        vec![
            FieldDescriptor::new(
                "total_systems",
                "Total Number of Systems",
                FieldKind::integer(Some(1), None),
            ),
            system_count("pre_installed", "Pre-installed (how many)"),
            system_count("boot_iso", "Boot from ISO (how many)"),
            FieldDescriptor::new(
                "cpu_per_system",
                "CPU Cores per System",
                FieldKind::choice(&["2", "4", "8", "16", "Varies by System"])
                    .with_other("Varies by System", "cpu_notes"),
            ),
            other_text("cpu_notes", "CPU requirements per system"),
            FieldDescriptor::new(
                "ram_per_system",
                "RAM per System",
                FieldKind::choice(&["2GB", "4GB", "8GB", "16GB", "Other"])
                    .with_other("Other", "ram_other"),
            ),
            other_text("ram_other", "RAM per System (other)"),
            FieldDescriptor::new(
                "partitions",
                "Partitions per System",
                FieldKind::integer(Some(1), Some(10)),
            ),
            FieldDescriptor::new(
                "partition_size",
                "Space per Partition",
                FieldKind::choice(&["20GB", "40GB", "60GB", "100GB", "200GB", "Other"])
                    .with_other("Other", "partition_size_other"),
            ),
            other_text("partition_size_other", "Space per Partition (other)"),
            FieldDescriptor::new("cd_rom", "CD-ROM Required", FieldKind::Boolean),
            FieldDescriptor::new(
                "nested_virtualization",
                "Nested Virtualization",
                FieldKind::multi_choice(&["GNS3", "Hyper-V", "Docker", "Other"])
                    .with_other("Other", "nested_virtualization_other"),
            )
            .with_optional(),
            other_text("nested_virtualization_other", "Nested Virtualization (other)"),
            system_count("win10", "Windows 10"),
            system_count("win11", "Windows 11"),
            system_count("win_server", "Windows Server"),
            other_text("other_win", "Other Windows versions")
                .with_help("Version and count, e.g. \"Windows 7 x2\"."),
            system_count("ubuntu", "Ubuntu"),
            system_count("centos", "CentOS"),
            system_count("kali", "Kali Linux"),
            other_text("other_linux", "Other Linux distros")
                .with_help("Distro and count."),
            system_count("openvas", "OpenVAS"),
            system_count("vyos", "VyOS"),
            system_count("pfsense", "pfSense"),
            other_text("other_os", "Other systems"),
            FieldDescriptor::new(
                "network_type",
                "Network Type",
                FieldKind::choice(&["Stand-Alone", "Server/Client", "Peer-to-Peer", "Domain"]),
            ),
            FieldDescriptor::new(
                "subnets",
                "Number of Subnets",
                FieldKind::integer(Some(1), None),
            ),
            FieldDescriptor::new("internet_access", "Internet Access", FieldKind::Boolean),
            FieldDescriptor::new("other_requirements", "Other Requirements", FieldKind::Text)
                .with_optional()
                .with_help("Any specialized requirements not listed above."),
            FieldDescriptor::new("notes", "Additional Notes", FieldKind::Text).with_optional(),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_survey_is_well_formed() {
        assert_eq!(lab_survey().check(), Ok(()));
    }

    #[test]
    fn hardware_collects_system_counts_by_os() {
        let survey = lab_survey();
        let hardware = survey.section(&SectionId::from(HARDWARE)).unwrap();
        for key in ["pre_installed", "boot_iso", "win10", "ubuntu", "pfsense"] {
            let field = hardware.field(key).unwrap();
            assert!(!field.required, "{key} should be optional");
            assert_eq!(field.kind, FieldKind::integer(Some(0), None));
        }
        for key in ["other_win", "other_linux", "other_os"] {
            assert_eq!(hardware.field(key).unwrap().kind, FieldKind::Text);
        }
    }

    #[test]
    fn course_governs_lab_pages() {
        let survey = lab_survey();
        assert!(survey.governs_items(&SectionId::from(COURSE)));
        assert!(!survey.governs_items(&SectionId::from(CONTACT)));
    }
}
