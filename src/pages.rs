//! Static "Our Project" and "Our Team" pages

use std::path::Path;

pub const PROJECT_TITLE: &str =
    "AI Driven Hyperlocal Dynamic Machine Learning Model To Predict Crop Yield";

pub const PROBLEM_STATEMENT: &str = "\
Agriculture is a vital sector that sustains the global population by providing food and raw \
materials. However, modern agricultural systems face increasing challenges due to growing \
population pressures, climate change, and the need for sustainable resource management. One of \
the major challenges for farmers and agricultural stakeholders is predicting crop yields \
accurately, a task that is crucial for optimizing resource allocation and ensuring food security. \
Traditional methods of yield prediction, which rely on historical data or general weather \
patterns, are often inadequate in the face of rapidly changing environmental conditions and \
localized farming practices. The lack of precision in these predictions leads to inefficiencies \
in crop management, resource use, and ultimately, agricultural productivity.";

pub const OBJECTIVES: [&str; 3] = [
    "To analyze remote sensing data to improve yield prediction accuracy and capture critical \
     environmental and crop health factors like NDVI & EVI.",
    "To develop a highly accurate machine learning model that predicts crop yield by leveraging \
     both spatial and temporal features extracted from satellite data.",
    "To study groundnut crop yield across five districts of Gujarat using real-time data from \
     MODIS satellite.",
];

/// Architecture diagram, looked up relative to the asset directory
pub const ARCHITECTURE_IMAGE: &str = "System_Architecture.png";

pub const DEMO_VIDEO_URL: &str =
    "https://drive.google.com/file/d/1MTLHa3f7b8dQaIgXUYzf2ppNHIAGjlbX/view?usp=drive_link";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamMember {
    pub name: &'static str,
    pub role: &'static str,
    pub linkedin: &'static str,
}

pub const PROJECT_GUIDE: TeamMember = TeamMember {
    name: "Ms. Priya Kaul",
    role: "Project Guide",
    linkedin: "https://www.linkedin.com/in/priya-kaul/",
};

pub const TEAM_MEMBERS: [TeamMember; 3] = [
    TeamMember {
        name: "Srushti Kale",
        role: "Team Member",
        linkedin: "https://www.linkedin.com/in/srushtikale07/",
    },
    TeamMember {
        name: "Manish Patil",
        role: "Team Member",
        linkedin: "https://www.linkedin.com/in/manish-patil-687356248/",
    },
    TeamMember {
        name: "Shweta Nadar",
        role: "Team Member",
        linkedin: "https://www.linkedin.com/in/shwetanadar/",
    },
];

/// Render the project page. A missing architecture image yields a warning line.
pub fn render_project(asset_dir: &Path) -> String {
    let mut lines = vec![
        "# Our Project".to_string(),
        String::new(),
        PROJECT_TITLE.to_string(),
        String::new(),
        "## Problem Statement".to_string(),
        String::new(),
        PROBLEM_STATEMENT.to_string(),
        String::new(),
        "## Objectives".to_string(),
        String::new(),
    ];
    lines.extend(
        OBJECTIVES
            .iter()
            .enumerate()
            .map(|(i, objective)| format!("{}. {objective}", i + 1)),
    );

    lines.extend([String::new(), "## System Architecture".to_string(), String::new()]);
    let image = asset_dir.join(ARCHITECTURE_IMAGE);
    if image.is_file() {
        lines.push(format!("Diagram: {}", image.display()));
    } else {
        lines.push(format!(
            "Warning: system architecture image not found at {}",
            image.display()
        ));
    }

    lines.extend([
        String::new(),
        "## Project Demo".to_string(),
        String::new(),
        format!("Watch Project Demo Video: {DEMO_VIDEO_URL}"),
    ]);
    lines.join("\n")
}

fn card(member: &TeamMember) -> String {
    format!(
        "  {}\n  {}\n  LinkedIn Profile: {}",
        member.name, member.role, member.linkedin
    )
}

/// Render the team page: guide first, then members.
pub fn render_team() -> String {
    let mut sections = vec![
        "# Our Team\n\n## Meet the Team Behind the Project".to_string(),
        card(&PROJECT_GUIDE),
    ];
    sections.extend(TEAM_MEMBERS.iter().map(card));
    sections.join("\n\n")
}
